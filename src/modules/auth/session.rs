use serde::{Deserialize, Serialize};
use std::fmt;

use super::store::{Role, UserRecord};

/// The currently authenticated caller, held in the ephemeral store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub role: Role,
    pub email: String,
}

impl From<&UserRecord> for Session {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            role: user.role,
            email: user.email.clone(),
        }
    }
}

/// Where the caller should navigate next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    AdminDashboard,
    VendorDashboard,
    RiderDashboard,
    CustomerDashboard,
    /// Default landing page after logout
    Landing,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::AdminDashboard => "/admin/admin_dashboard.html",
            Destination::VendorDashboard => "/vendor/vendor_dashboard.html",
            Destination::RiderDashboard => "/rider/rider_dashboard.html",
            Destination::CustomerDashboard => "/customer/customer_dashboard.html",
            Destination::Landing => "/index.html",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Dashboard for a role; no role means customer
pub fn route_for_role(role: Option<Role>) -> Destination {
    match role {
        Some(Role::Admin) => Destination::AdminDashboard,
        Some(Role::Vendor) => Destination::VendorDashboard,
        Some(Role::Rider) => Destination::RiderDashboard,
        Some(Role::Customer) | None => Destination::CustomerDashboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_for_role() {
        assert_eq!(route_for_role(Some(Role::Admin)).path(), "/admin/admin_dashboard.html");
        assert_eq!(route_for_role(Some(Role::Vendor)).path(), "/vendor/vendor_dashboard.html");
        assert_eq!(route_for_role(Some(Role::Rider)).path(), "/rider/rider_dashboard.html");
        assert_eq!(
            route_for_role(Some(Role::Customer)),
            Destination::CustomerDashboard
        );
        assert_eq!(route_for_role(None), Destination::CustomerDashboard);
    }

    #[test]
    fn test_session_json_shape() {
        let session = Session {
            id: "u_1".to_string(),
            role: Role::Rider,
            email: "rider@example.com".to_string(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(json, r#"{"id":"u_1","role":"rider","email":"rider@example.com"}"#);

        // Unknown or missing roles read back as customer
        let parsed: Session =
            serde_json::from_str(r#"{"id":"u_2","role":"chef","email":"c@example.com"}"#).unwrap();
        assert_eq!(parsed.role, Role::Customer);
        let parsed: Session = serde_json::from_str(r#"{"id":"u_3","email":"d@example.com"}"#).unwrap();
        assert_eq!(parsed.role, Role::Customer);
    }

    #[test]
    fn test_landing_destination() {
        assert_eq!(Destination::Landing.to_string(), "/index.html");
    }
}
