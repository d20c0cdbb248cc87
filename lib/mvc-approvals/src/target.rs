//! Controller/action descriptors.

use std::borrow::Cow;

use crate::MvcError;
use crate::fields::FormFields;

const CONTROLLER_SUFFIX: &str = "Controller";

/// Query parameter carrying the path of the test executable.
pub const ASSEMBLY_PATH_PARAM: &str = "assemblyPath";

/// A controller type whose actions can be verified.
///
/// The default name is derived from the Rust type name, see
/// [`controller_name_of`]. Override [`Controller::controller_name`] when the
/// route name differs.
///
/// ```rust
/// use mvc_approvals::Controller;
///
/// struct HomeController;
/// impl Controller for HomeController {}
///
/// assert_eq!(HomeController::controller_name(), "Home");
/// ```
pub trait Controller {
    /// The route segment of this controller.
    fn controller_name() -> Cow<'static, str> {
        Cow::Owned(controller_name_of::<Self>())
    }
}

/// Derives a controller name from a type: the last path segment of its type
/// name, without generic arguments and without one trailing `Controller`.
///
/// ```rust
/// use mvc_approvals::controller_name_of;
///
/// struct AccountController;
/// assert_eq!(controller_name_of::<AccountController>(), "Account");
/// ```
pub fn controller_name_of<T: ?Sized>() -> String {
    strip_controller_suffix(short_type_name(std::any::type_name::<T>())).to_string()
}

fn short_type_name(full: &str) -> &str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

fn strip_controller_suffix(name: &str) -> &str {
    name.strip_suffix(CONTROLLER_SUFFIX).unwrap_or(name)
}

/// The controller action a verification targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTarget {
    controller: String,
    action: String,
    owner: Option<&'static str>,
}

impl ActionTarget {
    /// Creates a target from explicit route names.
    ///
    /// A trailing `Controller` on the controller name is stripped, so
    /// `ActionTarget::new("HomeController", "Index")` targets `/Home/Index`.
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        let controller = controller.into();
        let controller = strip_controller_suffix(&controller).to_string();
        Self {
            controller,
            action: action.into(),
            owner: None,
        }
    }

    /// Creates a target for an action of the controller type `C`.
    ///
    /// Typed targets also send the [`ASSEMBLY_PATH_PARAM`] context parameter
    /// on GET. Form POSTs send it for every target.
    pub fn of<C>(action: impl Into<String>) -> Self
    where
        C: Controller + ?Sized,
    {
        Self {
            controller: C::controller_name().into_owned(),
            action: action.into(),
            owner: Some(std::any::type_name::<C>()),
        }
    }

    /// The controller route segment.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// The action route segment.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The full type name of the controller, for typed targets.
    pub fn owner(&self) -> Option<&'static str> {
        self.owner
    }

    /// Snapshot name used for this target: `<Controller>.<Action>`.
    pub fn snapshot_name(&self) -> String {
        format!("{}.{}", self.controller, self.action)
    }

    pub(crate) fn validate(&self) -> Result<(), MvcError> {
        if self.controller.trim().is_empty() {
            return Err(MvcError::InvalidTarget {
                message: format!("empty controller name for action '{}'", self.action),
            });
        }
        if self.action.trim().is_empty() {
            return Err(MvcError::InvalidTarget {
                message: format!("empty action name for controller '{}'", self.controller),
            });
        }
        Ok(())
    }

    /// Context query of a GET: only typed targets send the executable path.
    pub(crate) fn page_query(&self) -> Result<FormFields, MvcError> {
        if self.owner.is_some() {
            assembly_query()
        } else {
            Ok(FormFields::new())
        }
    }

    /// Context query of a form POST: the executable path is always sent.
    pub(crate) fn post_query(&self) -> Result<FormFields, MvcError> {
        assembly_query()
    }
}

fn assembly_query() -> Result<FormFields, MvcError> {
    let exe = std::env::current_exe()?;
    Ok(FormFields::new().add(ASSEMBLY_PATH_PARAM, exe.display().to_string()))
}
