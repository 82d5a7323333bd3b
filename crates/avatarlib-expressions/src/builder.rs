//! Fluent builder for nested expression menus.

use crate::error::{ExprError, ExprResult};
use crate::menu::{Control, ControlParameter, ControlType, ExpressionsMenu, Label};

/// A sub-menu that has been begun but not yet attached to its parent.
#[derive(Debug)]
struct OpenSubMenu {
    parent: ExpressionsMenu,
    name: String,
    parameter_on_open: Option<ControlParameter>,
    value_on_open: f32,
}

/// Builds an [`ExpressionsMenu`], including nested sub-menus.
///
/// Every `add_*` method fails with [`ExprError::MenuOverflow`] once the
/// current menu holds eight controls.
///
/// ```
/// use avatarlib_expressions::MenuBuilder;
///
/// let menu = MenuBuilder::new("Root")
///     .add_toggle("Hat", "Hat", 1.0)?
///     .begin_sub_menu("Face", None, 1.0)
///     .add_button("Smile", "Gesture", 3.0)?
///     .end_sub_menu()?
///     .build()?;
///
/// assert_eq!(menu.controls.len(), 2);
/// # Ok::<(), avatarlib_expressions::ExprError>(())
/// ```
#[derive(Debug)]
pub struct MenuBuilder {
    menu: ExpressionsMenu,
    open: Vec<OpenSubMenu>,
}

impl MenuBuilder {
    /// Starts a new, empty menu.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_menu(ExpressionsMenu::new(name))
    }

    /// Continues adding controls to an existing menu.
    pub fn from_menu(menu: ExpressionsMenu) -> Self {
        Self {
            menu,
            open: Vec::new(),
        }
    }

    /// The menu currently receiving controls.
    pub fn menu(&self) -> &ExpressionsMenu {
        &self.menu
    }

    /// Nesting depth of open sub-menus.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn push(mut self, control: Control) -> ExprResult<Self> {
        self.menu.push_control(control)?;
        Ok(self)
    }

    pub fn add_button(
        self,
        name: &str,
        parameter: impl Into<ControlParameter>,
        value: f32,
    ) -> ExprResult<Self> {
        self.push(Control::button(name, parameter, value))
    }

    pub fn add_toggle(
        self,
        name: &str,
        parameter: impl Into<ControlParameter>,
        value: f32,
    ) -> ExprResult<Self> {
        self.push(Control::toggle(name, parameter, value))
    }

    /// Adds a finished sub-menu.
    pub fn add_sub_menu(
        self,
        name: &str,
        sub_menu: ExpressionsMenu,
        parameter_on_open: Option<ControlParameter>,
        value_on_open: f32,
    ) -> ExprResult<Self> {
        self.push(Control::sub_menu(name, sub_menu).on_open(parameter_on_open, value_on_open))
    }

    /// Adds a two-axis puppet; labels are horizontal then vertical.
    pub fn add_two_axis_puppet(
        self,
        name: &str,
        horizontal: impl Into<ControlParameter>,
        vertical: impl Into<ControlParameter>,
        labels: [Label; 2],
        parameter_on_open: Option<ControlParameter>,
        value_on_open: f32,
    ) -> ExprResult<Self> {
        let control = Control::puppet(
            name,
            ControlType::TwoAxisPuppet,
            vec![horizontal.into(), vertical.into()],
            labels.into(),
        );
        self.push(control.on_open(parameter_on_open, value_on_open))
    }

    /// Adds a four-axis puppet; parameters and labels are up, right, down, left.
    pub fn add_four_axis_puppet(
        self,
        name: &str,
        parameters: [ControlParameter; 4],
        labels: [Label; 4],
        parameter_on_open: Option<ControlParameter>,
        value_on_open: f32,
    ) -> ExprResult<Self> {
        let control = Control::puppet(
            name,
            ControlType::FourAxisPuppet,
            parameters.into(),
            labels.into(),
        );
        self.push(control.on_open(parameter_on_open, value_on_open))
    }

    pub fn add_radial_puppet(
        self,
        name: &str,
        rotation: impl Into<ControlParameter>,
        parameter_on_open: Option<ControlParameter>,
        value_on_open: f32,
    ) -> ExprResult<Self> {
        let control = Control::puppet(
            name,
            ControlType::RadialPuppet,
            vec![rotation.into()],
            Vec::new(),
        );
        self.push(control.on_open(parameter_on_open, value_on_open))
    }

    /// Starts a sub-menu. Controls go into it until [`end_sub_menu`](Self::end_sub_menu).
    pub fn begin_sub_menu(
        mut self,
        name: &str,
        parameter_on_open: Option<ControlParameter>,
        value_on_open: f32,
    ) -> Self {
        let parent = std::mem::replace(&mut self.menu, ExpressionsMenu::new(name));
        self.open.push(OpenSubMenu {
            parent,
            name: name.to_string(),
            parameter_on_open,
            value_on_open,
        });
        self
    }

    /// Attaches the current sub-menu to its parent and resumes the parent.
    ///
    /// The parent's capacity is checked here, not at `begin_sub_menu`.
    pub fn end_sub_menu(mut self) -> ExprResult<Self> {
        let open = self.open.pop().ok_or(ExprError::NoParentMenu)?;
        let sub_menu = std::mem::replace(&mut self.menu, open.parent);
        self.add_sub_menu(&open.name, sub_menu, open.parameter_on_open, open.value_on_open)
    }

    /// Finishes the menu. Fails if a sub-menu is still open.
    pub fn build(self) -> ExprResult<ExpressionsMenu> {
        match self.open.last() {
            Some(open) => Err(ExprError::UnclosedSubMenu {
                name: open.name.clone(),
            }),
            None => Ok(self.menu),
        }
    }
}
