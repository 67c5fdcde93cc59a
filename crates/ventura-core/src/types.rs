//! Core data types for the Ventura marketplace admin client

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Review identifier type
pub type ReviewId = String;

/// User identifier type
pub type UserId = String;

/// Product (pitch deck) identifier type
pub type ProductId = String;

/// Role-specific profile identifier type
pub type ProfileId = String;

/// Account role on the marketplace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Venture raising funds through a pitch deck
    Venture,
    /// Investor reviewing ventures
    Investor,
    /// Mentor offering guidance
    Mentor,
    /// Platform administrator
    Admin,
}

impl Role {
    /// Wire representation, as used in query strings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Venture => "VENTURE",
            Self::Investor => "INVESTOR",
            Self::Mentor => "MENTOR",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VENTURE" => Ok(Self::Venture),
            "INVESTOR" => Ok(Self::Investor),
            "MENTOR" => Ok(Self::Mentor),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Moderation status of a review
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    /// Awaiting an admin decision
    #[default]
    Pending,
    /// Approved by an admin
    Approved,
    /// Rejected by an admin
    Rejected,
}

impl ReviewStatus {
    /// Whether the review has already been decided
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Flattened pitch-deck fields carried by product reviews
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PitchDeckSnapshot {
    /// Product (venture) name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Industry sector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Funding stage, e.g. `SEED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    /// Amount being raised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_amount: Option<Decimal>,
    /// Problem the venture addresses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_statement: Option<String>,
    /// Uploaded pitch deck file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_deck_url: Option<String>,
    /// Traction metrics, metric name to value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traction_metrics: BTreeMap<String, serde_json::Value>,
}

/// Role-specific profile fields
///
/// Used both for the snapshot embedded in an [`ApprovalItem`] and for the
/// full investor/mentor profile fetched on the review page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileDetails {
    /// Profile identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfileId>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Organization or fund name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    /// Job title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short biography
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// `LinkedIn` profile URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    /// Website URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Industries of interest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industries: Option<Vec<String>>,
    /// Investment stages of interest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_stages: Option<Vec<String>>,
    /// Minimum check size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_size_min: Option<Decimal>,
    /// Maximum check size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_size_max: Option<Decimal>,
    /// Mentoring expertise areas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise_areas: Option<Vec<String>>,
    /// Free-text availability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    /// Years of professional experience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
}

impl ProfileDetails {
    /// Merge two profiles field by field, values in `self` winning
    #[must_use]
    pub fn merged_over(self, fallback: Self) -> Self {
        Self {
            id: self.id.or(fallback.id),
            full_name: self.full_name.or(fallback.full_name),
            email: self.email.or(fallback.email),
            organization_name: self.organization_name.or(fallback.organization_name),
            title: self.title.or(fallback.title),
            bio: self.bio.or(fallback.bio),
            linkedin_url: self.linkedin_url.or(fallback.linkedin_url),
            website: self.website.or(fallback.website),
            phone: self.phone.or(fallback.phone),
            location: self.location.or(fallback.location),
            industries: self.industries.or(fallback.industries),
            investment_stages: self.investment_stages.or(fallback.investment_stages),
            check_size_min: self.check_size_min.or(fallback.check_size_min),
            check_size_max: self.check_size_max.or(fallback.check_size_max),
            expertise_areas: self.expertise_areas.or(fallback.expertise_areas),
            availability: self.availability.or(fallback.availability),
            years_of_experience: self.years_of_experience.or(fallback.years_of_experience),
        }
    }
}

/// A pending moderation record: a profile or a pitch deck awaiting review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalItem {
    /// Review identifier
    pub id: ReviewId,
    /// Submitting user
    pub user_id: UserId,
    /// Product under review; present only for pitch-deck reviews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Role-specific profile under review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
    /// Role of the submitting user
    pub role: Role,
    /// Current review status
    #[serde(default)]
    pub status: ReviewStatus,
    /// When the submission was made
    pub submitted_at: DateTime<Utc>,
    /// When an admin decided the review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reason given on rejection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Submitting user's display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Submitting user's email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Pitch-deck snapshot, empty for profile reviews
    #[serde(flatten)]
    pub pitch_deck: PitchDeckSnapshot,
    /// Profile snapshot embedded by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_data: Option<ProfileDetails>,
}

impl ApprovalItem {
    /// Whether this review concerns a pitch deck rather than a profile
    #[must_use]
    pub const fn is_pitch_deck(&self) -> bool {
        self.product_id.is_some()
    }

    /// Name shown for the submitter, falling back to email then user id
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.user_email.as_deref())
            .unwrap_or(&self.user_id)
    }
}

/// Aggregate moderation counters shown on the admin dashboard
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    /// Reviews awaiting a decision
    pub pending_approvals: u64,
    /// Reviews approved
    pub approved_profiles: u64,
    /// Reviews rejected
    pub rejected_profiles: u64,
    /// All accounts
    pub total_users: u64,
    /// Venture accounts
    pub total_ventures: u64,
    /// Investor accounts
    pub total_investors: u64,
    /// Mentor accounts
    pub total_mentors: u64,
}

/// Summary of a role profile nested in a user record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileSummary {
    /// Profile identifier
    pub id: ProfileId,
    /// Review status of the profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    /// Organization or product name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An account record as listed in the admin user directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserListItem {
    /// User identifier
    pub id: UserId,
    /// Login email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub full_name: String,
    /// Account role
    pub role: Role,
    /// Whether the account may log in
    #[serde(default)]
    pub is_active: bool,
    /// Whether the email address was confirmed
    #[serde(default)]
    pub is_email_verified: bool,
    /// Registration time
    pub date_joined: DateTime<Utc>,
    /// Venture profile, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venture_profile: Option<ProfileSummary>,
    /// Investor profile, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investor_profile: Option<ProfileSummary>,
    /// Mentor profile, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor_profile: Option<ProfileSummary>,
}

/// A product listed in the admin product catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSummary {
    /// Product identifier
    pub id: ProductId,
    /// Product name
    pub name: String,
    /// Owning user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Review status of the pitch deck
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    /// Industry sector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A page of results in the backend's pagination envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paginated<T> {
    /// Total number of results across all pages
    pub count: u64,
    /// URL of the next page
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page
    #[serde(default)]
    pub previous: Option<String>,
    /// Results on this page
    pub results: Vec<T>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> Paginated<T> {
    /// Whether the page holds no results
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Access/refresh token pair held by the client
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived bearer token
    pub access: String,
    /// Long-lived token exchanged for new access tokens
    pub refresh: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}
