//! Expression menu tree and menu utilities.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExprError, ExprResult};

/// Maximum number of controls a single menu page can hold.
pub const MAX_CONTROLS: usize = 8;

/// Kind of a menu control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    Button,
    Toggle,
    SubMenu,
    TwoAxisPuppet,
    FourAxisPuppet,
    RadialPuppet,
}

/// Reference to an expression parameter by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlParameter {
    pub name: String,
}

impl ControlParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<&str> for ControlParameter {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ControlParameter {
    fn from(name: String) -> Self {
        Self { name }
    }
}

/// Axis label of a puppet control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A single entry of an expression menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub name: String,
    pub control_type: ControlType,
    /// Parameter set to `value` when the control is used or opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<ControlParameter>,
    #[serde(default)]
    pub value: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_menu: Option<Box<ExpressionsMenu>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_parameters: Vec<ControlParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl Control {
    fn new(name: impl Into<String>, control_type: ControlType) -> Self {
        Self {
            name: name.into(),
            control_type,
            parameter: None,
            value: 0.0,
            sub_menu: None,
            sub_parameters: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// A button setting `parameter` to `value` while held.
    pub fn button(name: impl Into<String>, parameter: impl Into<ControlParameter>, value: f32) -> Self {
        Self {
            parameter: Some(parameter.into()),
            value,
            ..Self::new(name, ControlType::Button)
        }
    }

    /// A toggle setting `parameter` to `value` while on.
    pub fn toggle(name: impl Into<String>, parameter: impl Into<ControlParameter>, value: f32) -> Self {
        Self {
            parameter: Some(parameter.into()),
            value,
            ..Self::new(name, ControlType::Toggle)
        }
    }

    /// A control opening `menu`.
    pub fn sub_menu(name: impl Into<String>, menu: ExpressionsMenu) -> Self {
        Self {
            sub_menu: Some(Box::new(menu)),
            ..Self::new(name, ControlType::SubMenu)
        }
    }

    /// A puppet control driven by `sub_parameters`.
    pub fn puppet(
        name: impl Into<String>,
        control_type: ControlType,
        sub_parameters: Vec<ControlParameter>,
        labels: Vec<Label>,
    ) -> Self {
        Self {
            sub_parameters,
            labels,
            ..Self::new(name, control_type)
        }
    }

    /// Sets the parameter driven while the control is open.
    pub fn on_open(mut self, parameter: Option<ControlParameter>, value: f32) -> Self {
        if let Some(parameter) = parameter {
            self.parameter = Some(parameter);
            self.value = value;
        }
        self
    }
}

/// One page of an expression menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionsMenu {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl ExpressionsMenu {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controls: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.controls.len() >= MAX_CONTROLS
    }

    /// Appends `control`, failing if the menu is full.
    pub fn push_control(&mut self, control: Control) -> ExprResult<()> {
        if self.is_full() {
            return Err(ExprError::menu_overflow(control.name, self.controls.len()));
        }
        self.controls.push(control);
        Ok(())
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.name == name)
    }
}

/// Adds `sub_menu` to `root` as a sub-menu control named `control_name`.
pub fn add_sub_menu(
    root: &mut ExpressionsMenu,
    control_name: &str,
    sub_menu: ExpressionsMenu,
) -> ExprResult<()> {
    root.push_control(Control::sub_menu(control_name, sub_menu))
}

/// Creates an empty sub-menu in `root` and returns it for population.
pub fn create_sub_menu<'m>(
    root: &'m mut ExpressionsMenu,
    control_name: &str,
) -> ExprResult<&'m mut ExpressionsMenu> {
    add_sub_menu(root, control_name, ExpressionsMenu::new(control_name))?;
    let index = root.controls.len() - 1;
    match root.controls[index].sub_menu.as_deref_mut() {
        Some(menu) => Ok(menu),
        None => unreachable!("sub-menu control was just pushed"),
    }
}

/// Creates a sub-menu in `root` holding `controls`.
pub fn create_sub_menu_with(
    root: &mut ExpressionsMenu,
    control_name: &str,
    controls: Vec<Control>,
) -> ExprResult<()> {
    let menu = ExpressionsMenu {
        name: control_name.to_string(),
        controls,
    };
    add_sub_menu(root, control_name, menu)
}

/// Removes every control whose name matches `pattern`.
pub fn remove_controls_matching(menu: &mut ExpressionsMenu, pattern: &Regex) -> usize {
    let before = menu.controls.len();
    menu.controls.retain(|c| !pattern.is_match(&c.name));
    let removed = before - menu.controls.len();
    debug!(menu = %menu.name, removed, "removed menu controls");
    removed
}

/// Compiles `pattern` and removes every matching control.
pub fn remove_controls(menu: &mut ExpressionsMenu, pattern: &str) -> ExprResult<usize> {
    let pattern = Regex::new(pattern)?;
    Ok(remove_controls_matching(menu, &pattern))
}
