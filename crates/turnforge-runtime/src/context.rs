use serde_json::Value;

use turnforge_engine::PLAYER_ID;
use turnforge_store::StateStore;
use turnforge_types::{
    ActiveSituation, Calibration, ContextOptions, ContextPacket, ContextSummary, EntityKind,
    EntityPerception, EscalationProfile, FailureStreak, NpcCapability, PendingThreat,
    PerceptionClarity, PerceptionIssue, RecentEvent, Scene, SituationObject, ThreatLevel,
    PENDING_THREAT_PREDICATE, SITUATION_PREDICATE,
};

use crate::Result;

// Bounds for the backward scans; these keep context assembly O(k) in the
// bound rather than O(event-count).
const RECENT_EVENT_LIMIT: usize = 5;
const STREAK_SCAN_LIMIT: usize = 20;
const LORE_MATCH_LIMIT: usize = 3;

/// Assembles the perception-filtered context packet for one turn.
///
/// Everything downstream of the builder sees the world only through the
/// packet; by default that means known facts and unobscured entities.
pub struct ContextBuilder<'a> {
    store: &'a StateStore,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }

    pub fn build_context(
        &self,
        campaign_id: &str,
        player_input: &str,
        options: &ContextOptions,
    ) -> Result<ContextPacket> {
        let campaign = self.store.ensure_campaign(campaign_id)?;

        let scene = self
            .store
            .get_scene()?
            .unwrap_or_else(|| Scene::new("", Vec::new()));

        let present_entities: Vec<String> = if options.include_obscured {
            scene.present_entity_ids.clone()
        } else {
            scene
                .present_entity_ids
                .iter()
                .filter(|id| !scene.obscured_entities.contains(id))
                .cloned()
                .collect()
        };

        // Present entities lead so caps trim the periphery first.
        let mut entities = self.store.get_entities_by_ids(&present_entities)?;
        for entity in self.store.get_all_entities()? {
            if !entities.iter().any(|e| e.id == entity.id) {
                entities.push(entity);
            }
        }
        if let Some(max) = options.max_entities {
            entities.truncate(max);
        }

        let mut facts = if options.include_world_facts {
            self.store.get_all_facts()?
        } else {
            self.store.get_known_facts()?
        };
        if let Some(max) = options.max_facts {
            facts.truncate(max);
        }

        let threads = self.store.get_active_threads()?;
        let clocks = self.store.get_all_clocks()?;
        let inventory = self.store.get_inventory(PLAYER_ID)?;

        let calibration: Calibration =
            serde_json::from_value(campaign.calibration.clone()).unwrap_or_default();

        let active_situations = self.collect_active_situations()?;
        let npc_capabilities = self.collect_npc_capabilities(&entities, &present_entities);
        let pending_threats = self.collect_pending_threats()?;

        let recent = self.store.get_recent_events(campaign_id, RECENT_EVENT_LIMIT)?;
        let recent_events: Vec<RecentEvent> = recent
            .iter()
            .map(|record| RecentEvent {
                turn_no: record.turn_no,
                player_input: record.player_input.clone(),
                final_text: record.final_text.clone(),
                engine_events: record.engine_events(),
            })
            .collect();

        let mut failure_streak = self.reconstruct_failure_streak(campaign_id)?;
        failure_streak.during_threat = !pending_threats.is_empty()
            || npc_capabilities
                .iter()
                .any(|npc| npc.threat_level.is_active_threat());

        let summary = ContextSummary {
            scene: self.summarize_scene(&scene),
            threads: threads
                .iter()
                .map(|t| t.title.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        };

        let lore_context = self.collect_lore(campaign_id, player_input);

        Ok(ContextPacket {
            scene,
            present_entities,
            entities,
            facts,
            threads,
            clocks,
            inventory,
            summary,
            recent_events,
            calibration,
            genre_rules: campaign.genre_rules,
            system: campaign.system,
            active_situations,
            npc_capabilities,
            pending_threats,
            failure_streak,
            lore_context,
        })
    }

    /// Whether (and how clearly) the player can currently perceive an
    /// entity.
    pub fn get_entity_perception(&self, entity_id: &str) -> Result<EntityPerception> {
        if self.store.get_entity(entity_id)?.is_none() {
            return Ok(EntityPerception {
                perceivable: false,
                clarity: PerceptionClarity::Clear,
                reason: Some(PerceptionIssue::NotKnown),
            });
        }

        let scene = self.store.get_scene()?;
        let Some(scene) = scene else {
            return Ok(EntityPerception {
                perceivable: false,
                clarity: PerceptionClarity::Clear,
                reason: Some(PerceptionIssue::NotPresent),
            });
        };

        if !scene.present_entity_ids.iter().any(|id| id == entity_id) {
            return Ok(EntityPerception {
                perceivable: false,
                clarity: PerceptionClarity::Clear,
                reason: Some(PerceptionIssue::NotPresent),
            });
        }

        let obscured = scene.obscured_entities.iter().any(|id| id == entity_id);
        Ok(EntityPerception {
            perceivable: true,
            clarity: if obscured {
                PerceptionClarity::Obscured
            } else {
                PerceptionClarity::Clear
            },
            reason: None,
        })
    }

    fn collect_active_situations(&self) -> Result<Vec<ActiveSituation>> {
        let mut situations = Vec::new();
        for fact in self.store.get_known_facts()? {
            if fact.predicate != SITUATION_PREDICATE {
                continue;
            }
            let Some(object) = SituationObject::parse(&fact.object) else {
                continue;
            };
            if !object.active {
                continue;
            }
            situations.push(ActiveSituation {
                fact_id: fact.id,
                condition: object.condition,
                severity: object.severity,
                source_action: object.source_action,
                clears_on: object.clears_on,
                narrative_hint: object.narrative_hint,
            });
        }
        Ok(situations)
    }

    fn collect_npc_capabilities(
        &self,
        entities: &[turnforge_types::Entity],
        present: &[String],
    ) -> Vec<NpcCapability> {
        entities
            .iter()
            .filter(|e| e.kind == EntityKind::Npc && present.contains(&e.id))
            .filter(|e| e.attrs.contains_key("capabilities"))
            .map(|e| NpcCapability {
                entity_id: e.id.clone(),
                name: e.name.clone(),
                threat_level: e
                    .attrs
                    .get("threat_level")
                    .and_then(|v| serde_json::from_value::<ThreatLevel>(v.clone()).ok())
                    .unwrap_or_default(),
                capabilities: string_list(e.attrs.get("capabilities")),
                equipment: string_list(e.attrs.get("equipment")),
                limitations: string_list(e.attrs.get("limitations")),
                escalation_profile: e
                    .attrs
                    .get("escalation_profile")
                    .and_then(|v| serde_json::from_value::<EscalationProfile>(v.clone()).ok())
                    .unwrap_or_default(),
            })
            .collect()
    }

    fn collect_pending_threats(&self) -> Result<Vec<PendingThreat>> {
        let mut threats = Vec::new();
        for fact in self.store.get_all_facts()? {
            if fact.predicate != PENDING_THREAT_PREDICATE {
                continue;
            }
            threats.push(PendingThreat {
                fact_id: fact.id,
                description: fact
                    .object
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                turn_declared: fact
                    .object
                    .get("turn_declared")
                    .and_then(Value::as_i64)
                    .unwrap_or(0),
                severity: fact
                    .object
                    .get("severity")
                    .and_then(Value::as_str)
                    .unwrap_or("soft")
                    .to_string(),
            });
        }
        Ok(threats)
    }

    /// Rebuild the failure streak from the most recent run of consecutive
    /// fully-failed turns, stopping at the first success. Turns without
    /// action outcomes (clarifications, pure GM moves) neither count nor
    /// break the run.
    fn reconstruct_failure_streak(&self, campaign_id: &str) -> Result<FailureStreak> {
        let recent = self.store.get_recent_events(campaign_id, STREAK_SCAN_LIMIT)?;

        let mut count = 0;
        let mut actions = Vec::new();
        for record in &recent {
            let events = record.engine_events();
            let outcomes: Vec<_> = events
                .iter()
                .filter_map(|e| e.action_outcome())
                .collect();
            if outcomes.is_empty() {
                continue;
            }
            let all_failed = outcomes
                .iter()
                .all(|o| *o == turnforge_types::ActionOutcomeKind::Failure);
            if !all_failed {
                break;
            }
            count += 1;
            for event in &events {
                if let turnforge_types::EngineEvent::ActionFailed { details, .. } = event {
                    actions.push(details.action.clone());
                }
            }
        }

        Ok(FailureStreak {
            count,
            actions,
            during_threat: false,
        })
    }

    fn summarize_scene(&self, scene: &Scene) -> String {
        if scene.location_id.is_empty() {
            return String::new();
        }
        let location_name = self
            .store
            .get_entity(&scene.location_id)
            .ok()
            .flatten()
            .map(|e| e.name)
            .unwrap_or_else(|| scene.location_id.clone());
        format!(
            "{} ({}, {} present)",
            location_name,
            scene.time.period.as_str(),
            scene.present_entity_ids.len()
        )
    }

    // Lore is optional: campaigns without packs (or queries FTS rejects)
    // just get an empty list.
    fn collect_lore(&self, campaign_id: &str, player_input: &str) -> Vec<Value> {
        let terms: Vec<&str> = player_input
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 3)
            .take(8)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }
        let query = terms.join(" OR ");
        match self
            .store
            .search_pack_chunks(campaign_id, &query, LORE_MATCH_LIMIT)
        {
            Ok(matches) => matches
                .into_iter()
                .map(|m| {
                    serde_json::json!({
                        "chunk_id": m.chunk_id,
                        "pack_id": m.pack_id,
                        "content": m.content,
                    })
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
