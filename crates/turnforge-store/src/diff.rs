use serde_json::Value;

use crate::{Error, Result, StateStore};
use turnforge_types::{new_fact_id, Fact, Scene, StateDiff, Visibility};

impl StateStore {
    /// Apply a resolved turn's state diff atomically.
    ///
    /// Returns the clock-trigger effects whose thresholds were crossed
    /// upward. Any failure rolls the whole diff back and surfaces as
    /// [`Error::DiffApply`].
    pub fn apply_state_diff(&self, diff: &StateDiff, turn_no: i64) -> Result<Vec<String>> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| Error::DiffApply(e.to_string()))?;

        let triggers = self
            .apply_diff_inner(diff, turn_no)
            .map_err(|e| Error::DiffApply(e.to_string()))?;

        tx.commit().map_err(|e| Error::DiffApply(e.to_string()))?;
        Ok(triggers)
    }

    fn apply_diff_inner(&self, diff: &StateDiff, turn_no: i64) -> Result<Vec<String>> {
        let mut triggers = Vec::new();

        for delta in &diff.clocks {
            triggers.extend(self.adjust_clock(&delta.id, delta.delta)?);
        }

        for add in &diff.facts_add {
            let fact = Fact {
                id: add.id.clone().unwrap_or_else(new_fact_id),
                subject_id: add.subject_id.clone(),
                predicate: add.predicate.clone(),
                object: add.object.clone(),
                visibility: add.visibility,
                confidence: 1.0,
                tags: add.tags.clone(),
                discovered_turn: None,
                discovery_method: None,
            };
            self.create_fact(&fact)?;
        }

        for update in &diff.facts_update {
            // Visibility promotions carry discovery provenance; the known
            // -> world direction is never applied.
            if update.visibility == Some(Visibility::Known) {
                if let Some(current) = self.get_fact(&update.id)? {
                    if current.visibility == Visibility::World {
                        self.mark_fact_discovered(&update.id, turn_no, "investigation")?;
                    }
                }
                self.update_fact(&update.id, update.object.as_ref(), None)?;
            } else {
                self.update_fact(&update.id, update.object.as_ref(), update.visibility)?;
            }
        }

        for change in &diff.inventory_changes {
            self.add_inventory(
                &change.owner_id,
                &change.item_id,
                change.delta,
                change.flags.as_ref(),
            )?;
        }

        if !diff.scene_update.is_empty() {
            self.apply_scene_update(&diff.scene_update)?;
        }

        for update in &diff.threads_update {
            self.update_thread(&update.id, update.status, update.title.as_deref())?;
        }

        for change in &diff.relationship_changes {
            self.update_relationship_intensity(
                &change.a_id,
                &change.b_id,
                &change.rel_type,
                change.delta,
            )?;
        }

        Ok(triggers)
    }

    fn apply_scene_update(
        &self,
        scene_update: &std::collections::BTreeMap<String, Value>,
    ) -> Result<()> {
        let current = self.get_scene()?;
        let mut scene_value = match current {
            Some(scene) => serde_json::to_value(&scene)?,
            None => {
                // No scene yet: only a full enough update can seed one.
                if !scene_update.contains_key("location_id") {
                    return Ok(());
                }
                serde_json::to_value(Scene::new("", Vec::new()))?
            }
        };

        if let Some(obj) = scene_value.as_object_mut() {
            for (key, value) in scene_update {
                obj.insert(key.clone(), value.clone());
            }
        }

        let merged: Scene = serde_json::from_value(scene_value)?;
        self.set_scene(&merged)
    }
}
