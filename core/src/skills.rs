//! Skill selection state for profile and project forms.

use serde_json::Value;

use crate::normalize::value_as_f64;
use crate::views::SkillView;

/// Coerces raw ids (numbers or numeric strings) to strictly positive
/// integers. Anything else is dropped, as are repeats.
pub fn coerce_skill_ids(raw: &[Value]) -> Vec<u64> {
    let mut ids = Vec::new();
    for id in raw.iter().filter_map(coerce_skill_id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// A single id, if it is a positive integer.
pub fn coerce_skill_id(raw: &Value) -> Option<u64> {
    let number = value_as_f64(raw)?;
    (number > 0.0 && number.fract() == 0.0 && number <= u64::MAX as f64).then_some(number as u64)
}

/// One catalog entry with its selection flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillOption {
    pub id: u64,
    pub nome: String,
    pub selected: bool,
}

type OnChange = Box<dyn FnMut(&[u64]) + Send>;

/// Ordered set of selected skill ids. Every change is reported to the
/// callback with the full updated list.
pub struct SkillSelection {
    selected: Vec<u64>,
    on_change: Option<OnChange>,
}

impl SkillSelection {
    pub fn new(initial: &[Value]) -> Self {
        Self {
            selected: coerce_skill_ids(initial),
            on_change: None,
        }
    }

    pub fn from_ids(initial: &[u64]) -> Self {
        let raw: Vec<Value> = initial.iter().map(|id| Value::from(*id)).collect();
        Self::new(&raw)
    }

    pub fn on_change(mut self, callback: impl FnMut(&[u64]) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn selected(&self) -> &[u64] {
        &self.selected
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selected.contains(&id)
    }

    /// Replaces the selection, e.g. when the edited record finishes loading.
    /// The callback is not invoked.
    pub fn reset(&mut self, ids: &[Value]) {
        self.selected = coerce_skill_ids(ids);
    }

    /// Adds or removes `raw`. Invalid ids are ignored without notifying.
    /// Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, raw: &Value) -> bool {
        let Some(id) = coerce_skill_id(raw) else {
            return false;
        };
        let now_selected = match self.selected.iter().position(|s| *s == id) {
            Some(index) => {
                self.selected.remove(index);
                false
            }
            None => {
                self.selected.push(id);
                true
            }
        };
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.selected);
        }
        now_selected
    }

    /// The catalog in its original order with selection flags.
    pub fn options(&self, catalog: &[SkillView]) -> Vec<SkillOption> {
        catalog
            .iter()
            .map(|skill| SkillOption {
                id: skill.id,
                nome: skill.nome.clone(),
                selected: self.is_selected(skill.id),
            })
            .collect()
    }

    /// Selection as the optional id list sent in profile and project
    /// payloads; empty becomes `None`.
    pub fn payload(&self) -> Option<Vec<u64>> {
        (!self.selected.is_empty()).then(|| self.selected.clone())
    }
}

impl std::fmt::Debug for SkillSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillSelection")
            .field("selected", &self.selected)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    #[test]
    fn coercion_keeps_positive_numeric_ids() {
        let raw = vec![json!("3"), json!(5), json!("abc"), json!(-1), json!(0)];
        assert_eq!(coerce_skill_ids(&raw), vec![3, 5]);
    }

    #[test]
    fn coercion_drops_fractions_nulls_and_repeats() {
        let raw = vec![json!(2.5), json!(null), json!("7"), json!(7), json!(4.0)];
        assert_eq!(coerce_skill_ids(&raw), vec![7, 4]);
    }

    #[test]
    fn toggle_reports_full_selection() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut selection = SkillSelection::from_ids(&[1])
            .on_change(move |ids| sink.lock().unwrap().push(ids.to_vec()));

        assert!(selection.toggle(&json!("4")));
        assert!(!selection.toggle(&json!(1)));
        assert!(!selection.toggle(&json!("nope")));

        assert_eq!(selection.selected(), &[4]);
        assert_eq!(*seen.lock().unwrap(), vec![vec![1, 4], vec![4]]);
    }

    #[test]
    fn options_flag_selected_catalog_entries() {
        let selection = SkillSelection::new(&[json!(2)]);
        let catalog = vec![
            SkillView { id: 1, nome: "Rust".to_string() },
            SkillView { id: 2, nome: "SQL".to_string() },
        ];
        let options = selection.options(&catalog);
        assert!(!options[0].selected);
        assert!(options[1].selected);
    }

    #[test]
    fn empty_selection_is_omitted_from_payload() {
        let mut selection = SkillSelection::new(&[]);
        assert_eq!(selection.payload(), None);
        selection.reset(&[json!("9")]);
        assert_eq!(selection.payload(), Some(vec![9]));
    }
}
