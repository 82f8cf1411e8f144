use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sphereflock_core::{AgentParams, BehaviorParams, FlockingParams, UpdateOrder};
use sphereflock_shared::{BehaviorSettings, FlockSettings, OrderSetting};

/// Reads a JSON settings file. Fields missing from the file keep their defaults.
pub fn load(path: &Path) -> Result<FlockSettings> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    FlockSettings::from_json(&json)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))
}

fn behavior(settings: &BehaviorSettings) -> BehaviorParams {
    BehaviorParams::new(settings.radius, settings.angle, settings.weight)
}

pub fn flocking_params(settings: &FlockSettings) -> FlockingParams {
    FlockingParams {
        separation: behavior(&settings.separation),
        alignment: behavior(&settings.alignment),
        cohesion: behavior(&settings.cohesion),
        obstacle_lookahead: settings.obstacle_lookahead,
    }
}

pub fn agent_params(settings: &FlockSettings) -> AgentParams {
    AgentParams {
        max_force: settings.agent.max_force,
        max_speed: settings.agent.max_speed,
        radius: settings.agent.radius,
        initial_speed_fraction: settings.agent.initial_speed_fraction,
        ..AgentParams::default()
    }
}

pub fn update_order(settings: &FlockSettings) -> UpdateOrder {
    match settings.update_order {
        OrderSetting::Sequential => UpdateOrder::Sequential,
        OrderSetting::Simultaneous => UpdateOrder::Simultaneous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_core_defaults() {
        let settings = FlockSettings::default();
        assert_eq!(flocking_params(&settings), FlockingParams::default());
    }

    #[test]
    fn test_agent_params_keep_spawn_distance() {
        let params = agent_params(&FlockSettings::default());
        assert_eq!(params.max_force, 27.0);
        assert_eq!(params.max_speed, 9.0);
        assert_eq!(params.radius, 1.0);
        assert_eq!(params.spawn_distance, AgentParams::default().spawn_distance);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load(Path::new("/nonexistent/flock.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/flock.json"));
    }
}
