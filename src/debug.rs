//! Keyboard driven tuning of named parameters.
//!
//! Worlds register `f32` parameters with a range and a step and read them back
//! by name every frame. While debugging is active, Tab cycles through the
//! parameters and ArrowUp/ArrowDown change the selected one. Every change is logged.

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

#[derive(Debug, Default)]
pub struct Debug {
    active: bool,
    params: Vec<Param>,
    selected: usize,
}

impl Debug {
    pub fn new(active: bool) -> Self {
        if active {
            log::info!("debug parameters active: Tab selects, ArrowUp/ArrowDown adjust");
        }
        Self {
            active,
            params: Vec::new(),
            selected: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Register a parameter and return its value. Registering a name again keeps the
    /// current value.
    pub fn add(&mut self, name: &str, value: f32, min: f32, max: f32, step: f32) -> f32 {
        if let Some(param) = self.params.iter().find(|p| p.name == name) {
            return param.value;
        }
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let value = value.clamp(min, max);
        self.params.push(Param {
            name: name.to_string(),
            value,
            min,
            max,
            step: step.abs(),
        });
        value
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.params.iter().find(|p| p.name == name).map(|p| p.value)
    }

    pub fn value_or(&self, name: &str, default: f32) -> f32 {
        self.get(name).unwrap_or(default)
    }

    /// Set a registered parameter, clamped to its range.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        match self.params.iter_mut().find(|p| p.name == name) {
            Some(param) => {
                param.value = value.clamp(param.min, param.max);
                true
            }
            None => false,
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn selected(&self) -> Option<&Param> {
        self.params.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.params.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.params.len();
        if let Some(param) = self.selected() {
            log::info!("debug: selected {} = {}", param.name, param.value);
        }
    }

    /// Move the selected parameter by `steps` steps.
    pub fn adjust(&mut self, steps: i32) {
        let Some(param) = self.params.get_mut(self.selected) else {
            return;
        };
        param.value = (param.value + param.step * steps as f32).clamp(param.min, param.max);
        log::info!("debug: {} = {}", param.name, param.value);
    }

    /// Returns `true` if the key press was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if !self.active || event.state != ElementState::Pressed {
            return false;
        }
        match event.physical_key {
            PhysicalKey::Code(code) => self.handle_key_code(code),
            _ => false,
        }
    }

    pub fn handle_key_code(&mut self, code: KeyCode) -> bool {
        if !self.active {
            return false;
        }
        match code {
            KeyCode::Tab => self.select_next(),
            KeyCode::ArrowUp => self.adjust(1),
            KeyCode::ArrowDown => self.adjust(-1),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_in_range() {
        let mut debug = Debug::new(true);
        debug.add("strength", 0.9, 0.0, 1.0, 0.25);
        debug.handle_key_code(KeyCode::ArrowUp);
        assert_eq!(debug.get("strength"), Some(1.0));
        for _ in 0..10 {
            debug.handle_key_code(KeyCode::ArrowDown);
        }
        assert_eq!(debug.get("strength"), Some(0.0));
    }

    #[test]
    fn tab_cycles_through_parameters() {
        let mut debug = Debug::new(true);
        debug.add("a", 0.0, 0.0, 1.0, 0.1);
        debug.add("b", 0.0, 0.0, 1.0, 0.1);
        assert_eq!(debug.selected().map(|p| p.name.as_str()), Some("a"));
        debug.handle_key_code(KeyCode::Tab);
        assert_eq!(debug.selected().map(|p| p.name.as_str()), Some("b"));
        debug.handle_key_code(KeyCode::Tab);
        assert_eq!(debug.selected().map(|p| p.name.as_str()), Some("a"));
    }

    #[test]
    fn inactive_registry_ignores_keys_but_keeps_values() {
        let mut debug = Debug::new(false);
        assert_eq!(debug.add("radius", 0.4, 0.0, 1.0, 0.1), 0.4);
        assert!(!debug.handle_key_code(KeyCode::ArrowUp));
        assert_eq!(debug.value_or("radius", 0.0), 0.4);
        assert_eq!(debug.value_or("missing", 7.0), 7.0);
    }
}
