use sphereflock_core::{
    AgentId, BruteForceDatabase, ConfigError, LocalityGrid, ProximityDatabase, ProximityToken, Vec3,
};
use sphereflock_shared::{FlockSettings, IndexSetting};

/// Proximity backend picked at runtime.
#[derive(Debug)]
pub enum SpatialIndex {
    BruteForce(BruteForceDatabase),
    Grid(LocalityGrid),
}

impl SpatialIndex {
    /// The grid spans the whole world sphere, one bin thick vertically since
    /// boids stay on the plane.
    pub fn from_settings(settings: &FlockSettings) -> Result<Self, ConfigError> {
        match settings.index {
            IndexSetting::BruteForce => Ok(Self::BruteForce(BruteForceDatabase::new())),
            IndexSetting::Grid => {
                let span = settings.world_radius * 2.0;
                let divisions = settings.grid_divisions;
                LocalityGrid::new(Vec3::ZERO, Vec3::new(span, span, span), [divisions, 1, divisions])
                    .map(Self::Grid)
            }
        }
    }
}

impl ProximityDatabase for SpatialIndex {
    fn allocate_token(&mut self, id: AgentId) -> ProximityToken {
        match self {
            Self::BruteForce(db) => db.allocate_token(id),
            Self::Grid(db) => db.allocate_token(id),
        }
    }

    fn release_token(&mut self, token: ProximityToken) {
        match self {
            Self::BruteForce(db) => db.release_token(token),
            Self::Grid(db) => db.release_token(token),
        }
    }

    fn update_for_new_position(&mut self, token: &ProximityToken, position: Vec3) {
        match self {
            Self::BruteForce(db) => db.update_for_new_position(token, position),
            Self::Grid(db) => db.update_for_new_position(token, position),
        }
    }

    fn find_neighbors(&self, center: Vec3, radius: f32, out: &mut Vec<AgentId>) {
        match self {
            Self::BruteForce(db) => db.find_neighbors(center, radius, out),
            Self::Grid(db) => db.find_neighbors(center, radius, out),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::BruteForce(db) => db.len(),
            Self::Grid(db) => db.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_grid_divisions_rejected() {
        let settings = FlockSettings {
            grid_divisions: 0,
            ..FlockSettings::default()
        };
        assert!(matches!(
            SpatialIndex::from_settings(&settings),
            Err(ConfigError::GridDivisions)
        ));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let settings = FlockSettings {
            grid_divisions: 100_000,
            ..FlockSettings::default()
        };
        assert!(matches!(
            SpatialIndex::from_settings(&settings),
            Err(ConfigError::GridDivisions)
        ));
    }

    #[test]
    fn test_brute_force_selected() {
        let settings = FlockSettings {
            index: IndexSetting::BruteForce,
            ..FlockSettings::default()
        };
        assert!(matches!(
            SpatialIndex::from_settings(&settings),
            Ok(SpatialIndex::BruteForce(_))
        ));
    }
}
