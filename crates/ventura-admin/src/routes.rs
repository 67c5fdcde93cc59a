//! Admin page routes
//!
//! Each detail page is addressed by a path plus camelCase query parameters,
//! e.g. `/dashboard/admin/profile-review?reviewId=R1`. Routes parse from
//! relative or absolute URLs and format back to relative ones.

use crate::error::{WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;
use ventura_core::{ApprovalItem, ProductId, ReviewId, UserId};

/// Path of the profile review page
pub const PROFILE_REVIEW_PATH: &str = "/dashboard/admin/profile-review";
/// Path of the pitch-deck review page
pub const PITCH_DECK_REVIEW_PATH: &str = "/dashboard/admin/pitch-deck-review";
/// Path of the user view page
pub const USER_VIEW_PATH: &str = "/dashboard/admin/user-view";

/// Base that relative routes are resolved against
const RELATIVE_BASE: &str = "http://ventura.invalid/";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewParams {
    review_id: ReviewId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserParams {
    user_id: UserId,
}

/// Parameters of the pitch-deck review page
///
/// Only the review id is required; the rest pre-fill the page and supply the
/// product id when the review record lacks one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchDeckRoute {
    /// Review to show
    pub review_id: ReviewId,
    /// Product under review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Product name, for display while loading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Submitter's name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Submitter's email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl PitchDeckRoute {
    /// Route carrying only the review id
    pub fn new(review_id: impl Into<ReviewId>) -> Self {
        Self {
            review_id: review_id.into(),
            ..Self::default()
        }
    }
}

/// A detail page in the admin area
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRoute {
    /// Investor or mentor profile review
    ProfileReview {
        /// Review to show
        review_id: ReviewId,
    },
    /// Venture pitch-deck review
    PitchDeckReview(PitchDeckRoute),
    /// Single user record
    UserView {
        /// User to show
        user_id: UserId,
    },
}

impl AdminRoute {
    /// Detail page for a queue item
    pub fn for_item(item: &ApprovalItem) -> Self {
        if item.is_pitch_deck() {
            Self::PitchDeckReview(PitchDeckRoute {
                review_id: item.id.clone(),
                product_id: item.product_id.clone(),
                product_name: item.pitch_deck.product_name.clone(),
                user_name: item.user_name.clone(),
                user_email: item.user_email.clone(),
            })
        } else {
            Self::ProfileReview {
                review_id: item.id.clone(),
            }
        }
    }

    /// Path component of the route
    pub const fn path(&self) -> &'static str {
        match self {
            Self::ProfileReview { .. } => PROFILE_REVIEW_PATH,
            Self::PitchDeckReview(_) => PITCH_DECK_REVIEW_PATH,
            Self::UserView { .. } => USER_VIEW_PATH,
        }
    }

    /// Relative URL with encoded query string
    pub fn to_url(&self) -> String {
        let query = match self {
            Self::ProfileReview { review_id } => serde_urlencoded::to_string(ReviewParams {
                review_id: review_id.clone(),
            }),
            Self::PitchDeckReview(params) => serde_urlencoded::to_string(params),
            Self::UserView { user_id } => serde_urlencoded::to_string(UserParams {
                user_id: user_id.clone(),
            }),
        };
        // Flat string fields always encode.
        format!("{}?{}", self.path(), query.unwrap_or_default())
    }

    /// Parse a relative or absolute URL
    pub fn parse(url: &str) -> WorkflowResult<Self> {
        let invalid = |reason: String| WorkflowError::invalid_route(url, reason);

        let parsed = Url::parse(RELATIVE_BASE)
            .and_then(|base| base.join(url.trim()))
            .map_err(|e| invalid(e.to_string()))?;
        let query = parsed.query().unwrap_or_default();
        let path = match parsed.path().trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        let route = match path {
            PROFILE_REVIEW_PATH => {
                let params: ReviewParams = decode(query).map_err(invalid)?;
                Self::ProfileReview {
                    review_id: params.review_id,
                }
            }
            PITCH_DECK_REVIEW_PATH => {
                Self::PitchDeckReview(decode::<PitchDeckRoute>(query).map_err(invalid)?)
            }
            USER_VIEW_PATH => {
                let params: UserParams = decode(query).map_err(invalid)?;
                Self::UserView {
                    user_id: params.user_id,
                }
            }
            _ => return Err(invalid("unknown page".to_string())),
        };

        let key = match &route {
            Self::ProfileReview { review_id }
            | Self::PitchDeckReview(PitchDeckRoute { review_id, .. }) => ("reviewId", review_id),
            Self::UserView { user_id } => ("userId", user_id),
        };
        if key.1.trim().is_empty() {
            return Err(invalid(format!("{} is empty", key.0)));
        }

        Ok(route)
    }
}

fn decode<T: for<'de> Deserialize<'de>>(query: &str) -> Result<T, String> {
    serde_urlencoded::from_str(query).map_err(|e| e.to_string())
}

impl fmt::Display for AdminRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

impl FromStr for AdminRoute {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_profile_review_round_trip() {
        let route = AdminRoute::ProfileReview {
            review_id: "R 1".to_string(),
        };
        let url = route.to_url();
        assert_eq!(url, "/dashboard/admin/profile-review?reviewId=R+1");
        assert_eq!(AdminRoute::parse(&url).unwrap(), route);
    }

    #[test]
    fn test_pitch_deck_route_from_absolute_url() {
        let route = AdminRoute::parse(
            "https://admin.ventura.io/dashboard/admin/pitch-deck-review?reviewId=R2&productId=P9&productName=Acme%20Robotics&userEmail=ada%40acme.io#top",
        )
        .unwrap();

        assert_eq!(
            route,
            AdminRoute::PitchDeckReview(PitchDeckRoute {
                review_id: "R2".to_string(),
                product_id: Some("P9".to_string()),
                product_name: Some("Acme Robotics".to_string()),
                user_name: None,
                user_email: Some("ada@acme.io".to_string()),
            })
        );
    }

    #[test]
    fn test_pitch_deck_route_omits_unset_params() {
        let url = AdminRoute::PitchDeckReview(PitchDeckRoute::new("R2")).to_url();
        assert_eq!(url, "/dashboard/admin/pitch-deck-review?reviewId=R2");
    }

    #[test]
    fn test_user_view_with_trailing_slash() {
        assert_eq!(
            "/dashboard/admin/user-view/?userId=U7".parse::<AdminRoute>().unwrap(),
            AdminRoute::UserView {
                user_id: "U7".to_string()
            }
        );
    }

    #[test]
    fn test_query_value_may_hold_a_url() {
        let route = AdminRoute::parse(
            "/dashboard/admin/pitch-deck-review?reviewId=R2&productName=https://acme.io/deck",
        )
        .unwrap();

        assert_eq!(
            route,
            AdminRoute::PitchDeckReview(PitchDeckRoute {
                product_name: Some("https://acme.io/deck".to_string()),
                ..PitchDeckRoute::new("R2")
            })
        );
    }

    #[test]
    fn test_relative_route_with_fragment() {
        assert_eq!(
            AdminRoute::parse("dashboard/admin/profile-review?reviewId=R1#notes").unwrap(),
            AdminRoute::ProfileReview {
                review_id: "R1".to_string()
            }
        );
    }

    #[rstest]
    #[case("/dashboard/admin/profile-review")]
    #[case("/dashboard/admin/profile-review?reviewId=")]
    #[case("/dashboard/admin/pitch-deck-review?productId=P9")]
    #[case("/dashboard/admin/user-view?reviewId=R1")]
    #[case("/dashboard/admin/unknown?reviewId=R1")]
    #[case("https://admin.ventura.io")]
    fn test_invalid_routes(#[case] url: &str) {
        assert!(matches!(
            AdminRoute::parse(url),
            Err(WorkflowError::InvalidRoute { .. })
        ));
    }
}
