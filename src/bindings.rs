//! Typed bindings between the debug panel and the materials.
//!
//! Each control is a descriptor owning its label, its current value and, for
//! selections, the allowed value set. Descriptors are validated when they
//! are built, so the panel can only ever write values the scene knows how to
//! resolve. The render loop reads the current values every tick and pushes
//! them onto the material parameters.

use anyhow::{Result, anyhow};

use crate::color::Rgb;

/// Which logo texture the plane material samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Logo {
    Color,
    White,
}

/// A freely editable colour control.
#[derive(Clone, Debug)]
pub struct ColorBinding {
    label: String,
    value: Rgb,
}

impl ColorBinding {
    pub fn new(label: impl Into<String>, value: Rgb) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self) -> Rgb {
        self.value
    }

    pub fn set(&mut self, value: Rgb) {
        self.value = value;
    }
}

/// A single-select control restricted to a fixed option list.
#[derive(Clone, Debug)]
pub struct SelectBinding<T> {
    label: String,
    options: Vec<(String, T)>,
    selected: usize,
}

impl<T: Copy + PartialEq> SelectBinding<T> {
    /// Build a selection over `options`, starting at `default`.
    ///
    /// Fails if the option list is empty or `default` is not one of the
    /// listed values.
    pub fn new(
        label: impl Into<String>,
        options: Vec<(impl Into<String>, T)>,
        default: T,
    ) -> Result<Self> {
        let label = label.into();
        if options.is_empty() {
            return Err(anyhow!("selection {label:?} has no options"));
        }
        let options: Vec<(String, T)> = options
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        let selected = options
            .iter()
            .position(|(_, value)| *value == default)
            .ok_or_else(|| anyhow!("default value of selection {label:?} is not an option"))?;
        Ok(Self {
            label,
            options,
            selected,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Option names in declaration order, for the panel.
    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|(name, _)| name.as_str())
    }

    pub fn selected(&self) -> T {
        self.options[self.selected].1
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Select by option index; out-of-range writes are rejected.
    pub fn select_index(&mut self, index: usize) -> Result<()> {
        if index >= self.options.len() {
            return Err(anyhow!(
                "selection {:?} has no option {index}",
                self.label
            ));
        }
        self.selected = index;
        Ok(())
    }

    /// Select by value; values outside the allowed set are rejected.
    pub fn select(&mut self, value: T) -> Result<()> {
        let index = self
            .options
            .iter()
            .position(|(_, v)| *v == value)
            .ok_or_else(|| anyhow!("value is not an option of selection {:?}", self.label))?;
        self.selected = index;
        Ok(())
    }
}

/// Everything the panel can mutate and the render loop re-reads per tick.
#[derive(Clone, Debug)]
pub struct BindingState {
    pub tint: ColorBinding,
    pub logo: SelectBinding<Logo>,
}

impl BindingState {
    pub fn new(default_tint: Rgb) -> Self {
        let logo = SelectBinding::new(
            "texture",
            vec![("LogoColor", Logo::Color), ("LogoWhite", Logo::White)],
            Logo::Color,
        )
        .expect("logo options are a fixed non-empty set");
        Self {
            tint: ColorBinding::new("color", default_tint),
            logo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_rejects_empty_options() {
        let empty: Vec<(&str, Logo)> = Vec::new();
        assert!(SelectBinding::new("texture", empty, Logo::Color).is_err());
    }

    #[test]
    fn selection_rejects_default_outside_the_set() {
        let result = SelectBinding::new("texture", vec![("LogoColor", Logo::Color)], Logo::White);
        assert!(result.is_err());
    }

    #[test]
    fn selection_switches_between_allowed_values() {
        let mut state = BindingState::new(Rgb::from_hex("#110d0d").unwrap());
        assert_eq!(state.logo.selected(), Logo::Color);
        state.logo.select(Logo::White).unwrap();
        assert_eq!(state.logo.selected(), Logo::White);
        state.logo.select_index(0).unwrap();
        assert_eq!(state.logo.selected(), Logo::Color);
    }

    #[test]
    fn out_of_range_index_leaves_the_selection_alone() {
        let mut state = BindingState::new(Rgb::WHITE);
        assert!(state.logo.select_index(7).is_err());
        assert_eq!(state.logo.selected(), Logo::Color);
    }

    #[test]
    fn tint_reads_back_what_was_written() {
        let mut state = BindingState::new(Rgb::from_hex("#110d0d").unwrap());
        assert_eq!(state.tint.get().to_hex(), "#110d0d");
        state.tint.set(Rgb::from_hex("#3fa9c1").unwrap());
        assert_eq!(state.tint.get().to_hex(), "#3fa9c1");
    }

    #[test]
    fn panel_labels_match_the_bound_fields() {
        let state = BindingState::new(Rgb::WHITE);
        assert_eq!(state.tint.label(), "color");
        assert_eq!(state.logo.label(), "texture");
        let names: Vec<&str> = state.logo.option_names().collect();
        assert_eq!(names, ["LogoColor", "LogoWhite"]);
    }
}
