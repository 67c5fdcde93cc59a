//! User directory and single-user view

use crate::error::{WorkflowError, WorkflowResult};
use crate::notice::Notice;
use crate::review::PageState;
use crate::routes::AdminRoute;
use tracing::{info, instrument, warn};
use ventura_client::{AdminService, UpdateUserRequest, UserQuery};
use ventura_core::{Role, UserId, UserListItem};

/// Paged list of accounts with search and role filters
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Vec<UserListItem>,
    total: u64,
    query: UserQuery,
    notice: Option<Notice>,
}

impl UserDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Current query
    pub const fn query(&self) -> &UserQuery {
        &self.query
    }

    /// Set the search text; takes effect on the next load
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        self.query.search = (!search.trim().is_empty()).then_some(search);
        self.query.page = None;
    }

    /// Set or clear the role filter; takes effect on the next load
    pub const fn set_role(&mut self, role: Option<Role>) {
        self.query.role = role;
        self.query.page = None;
    }

    /// Select a page; takes effect on the next load
    pub const fn set_page(&mut self, page: u32) {
        self.query.page = Some(page);
    }

    /// Fetch the users matching the current query
    #[instrument(skip_all)]
    pub async fn load(&mut self, admin: &dyn AdminService) -> WorkflowResult<()> {
        let page = admin.users(&self.query).await?;
        self.total = page.count;
        self.users = page.results;
        Ok(())
    }

    /// Users on the current page
    pub fn users(&self) -> &[UserListItem] {
        &self.users
    }

    /// Total matching users across pages
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Notice from the last action
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Enable or disable an account, updating the listed record
    pub async fn set_active(
        &mut self,
        admin: &dyn AdminService,
        user_id: &str,
        active: bool,
    ) -> WorkflowResult<Notice> {
        let index = self.index(user_id)?;
        match admin
            .update_user(user_id, &UpdateUserRequest::active(active))
            .await
        {
            Ok(updated) => {
                self.users[index] = updated;
                let verb = if active { "activated" } else { "deactivated" };
                info!(user_id, verb, "User status changed");
                Ok(self.succeed(format!("User {verb} successfully")))
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Delete an account and drop it from the list
    pub async fn delete(&mut self, admin: &dyn AdminService, user_id: &str) -> WorkflowResult<Notice> {
        let index = self.index(user_id)?;
        match admin.delete_user(user_id).await {
            Ok(()) => {
                self.users.remove(index);
                self.total = self.total.saturating_sub(1);
                Ok(self.succeed("User deleted successfully"))
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Detail page for a listed user
    pub fn route(user: &UserListItem) -> AdminRoute {
        AdminRoute::UserView {
            user_id: user.id.clone(),
        }
    }

    fn index(&self, user_id: &str) -> WorkflowResult<usize> {
        self.users
            .iter()
            .position(|user| user.id == user_id)
            .ok_or_else(|| WorkflowError::unknown_item(user_id))
    }

    fn succeed(&mut self, message: impl Into<String>) -> Notice {
        let notice = Notice::success(message);
        self.notice = Some(notice.clone());
        notice
    }

    fn fail(&mut self, err: WorkflowError) -> WorkflowError {
        warn!(error = %err, "User action failed");
        self.notice = Some(Notice::error(err.user_message()));
        err
    }
}

/// Detail page for one account
#[derive(Debug)]
pub struct UserViewPage {
    user_id: UserId,
    state: PageState<UserListItem>,
}

impl UserViewPage {
    /// Page for `user_id`, not yet loaded
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            state: PageState::Loading,
        }
    }

    /// Page addressed by a user-view route
    pub fn from_route(route: &AdminRoute) -> WorkflowResult<Self> {
        match route {
            AdminRoute::UserView { user_id } => Ok(Self::new(user_id.clone())),
            other => Err(WorkflowError::invalid_route(other.to_url(), "not a user page")),
        }
    }

    /// Current page state
    pub const fn state(&self) -> &PageState<UserListItem> {
        &self.state
    }

    /// Fetch the user; any failure leaves the page not found
    pub async fn load(&mut self, admin: &dyn AdminService) {
        self.state = match admin.user(&self.user_id).await {
            Ok(user) => PageState::Ready(user),
            Err(err) => {
                warn!(user_id = %self.user_id, error = %err, "Failed to load user");
                PageState::NotFound
            }
        };
    }

    /// Enable or disable the account, staying on the page
    pub async fn set_active(&mut self, admin: &dyn AdminService, active: bool) -> WorkflowResult<Notice> {
        if self.state.ready().is_none() {
            return Err(WorkflowError::not_ready(self.state.label()));
        }
        let updated = admin
            .update_user(&self.user_id, &UpdateUserRequest::active(active))
            .await?;
        self.state = PageState::Ready(updated);
        Ok(Notice::success(if active {
            "User activated successfully"
        } else {
            "User deactivated successfully"
        }))
    }

    /// Delete the account and close the page
    pub async fn delete(&mut self, admin: &dyn AdminService) -> WorkflowResult<Notice> {
        if self.state.ready().is_none() {
            return Err(WorkflowError::not_ready(self.state.label()));
        }
        admin.delete_user(&self.user_id).await?;
        let notice = Notice::success("User deleted successfully");
        self.state = PageState::Closed(notice.clone());
        Ok(notice)
    }
}
