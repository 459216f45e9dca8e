//! Per-role read/command surfaces. A view holds no state of its own: it
//! reads snapshots from the coordinator and issues commands through it.

pub mod admin_view;
pub mod contractor_view;
pub mod pm_view;

use crate::{
    models::usermodel::{User, UserRole},
    service::{coordinator::PortalCoordinator, error::ServiceError},
};

pub use admin_view::AdminView;
pub use contractor_view::ContractorView;
pub use pm_view::PmView;

#[derive(Debug)]
pub enum RoleView<'a> {
    PropertyManager(PmView<'a>),
    Contractor(ContractorView<'a>),
    Admin(AdminView<'a>),
}

impl<'a> RoleView<'a> {
    pub fn for_user(coordinator: &'a PortalCoordinator, user: User) -> Self {
        match user.role {
            UserRole::PropertyManager => RoleView::PropertyManager(PmView { coordinator, actor: user }),
            UserRole::Contractor => RoleView::Contractor(ContractorView { coordinator, actor: user }),
            UserRole::Admin => RoleView::Admin(AdminView { coordinator, actor: user }),
        }
    }

    pub fn role(&self) -> UserRole {
        match self {
            RoleView::PropertyManager(_) => UserRole::PropertyManager,
            RoleView::Contractor(_) => UserRole::Contractor,
            RoleView::Admin(_) => UserRole::Admin,
        }
    }

    pub fn actor(&self) -> &User {
        match self {
            RoleView::PropertyManager(view) => &view.actor,
            RoleView::Contractor(view) => &view.actor,
            RoleView::Admin(view) => &view.actor,
        }
    }
}

pub(crate) fn require_role(user: &User, role: UserRole) -> Result<(), ServiceError> {
    if user.role == role {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "this view requires the {} role",
            role.to_str()
        )))
    }
}
