//! Slingshot state machine
//!
//! Owns the turkey's launch cycle: hold it on the elastic band, fling it on
//! release, watch for the landing, then count down and put a fresh turkey
//! back on the band. The respawn countdown is measured in ticks and only
//! advances through [`Sling::update`], so nothing fires once the game stops
//! ticking.

use glam::Vec2;

use super::level::LevelLayout;
use super::state::{ElasticConstraint, FlightPhase, LandingReason, SlingEvent};
use crate::physics::{BodyId, BodySnapshot, Physics};
use crate::tuning::Tuning;

/// Landing predicate: lowest point at or below the ground surface, and nearly still
pub fn has_landed(body: &BodySnapshot, ground_level: f32, tuning: &Tuning) -> bool {
    body.bottom >= ground_level && body.speed() < tuning.landing_speed
}

#[derive(Debug, Clone)]
pub struct Sling {
    phase: FlightPhase,
    elastic: ElasticConstraint,
    projectile: BodyId,
    /// Consecutive in-flight ticks below the landing speed
    slow_ticks: u32,
    /// Last known projectile position, reported if it goes missing
    last_seen: Vec2,
}

impl Sling {
    /// Spawn the first turkey and hook the band to it
    pub fn new<P: Physics>(physics: &mut P, level: &LevelLayout, tuning: &Tuning) -> Self {
        let projectile = physics.add_body(&level.projectile(tuning));
        let elastic = ElasticConstraint::new(level.spawn, projectile, tuning.elastic_stiffness, tuning.elastic_damping);
        physics.set_elastic(elastic.link());

        Self {
            phase: FlightPhase::Attached,
            elastic,
            projectile,
            slow_ticks: 0,
            last_seen: level.spawn,
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn projectile(&self) -> BodyId {
        self.projectile
    }

    pub fn elastic(&self) -> &ElasticConstraint {
        &self.elastic
    }

    /// The flight flag: launched and not yet landed
    #[inline]
    pub fn is_launched(&self) -> bool {
        self.phase == FlightPhase::InFlight
    }

    /// Zoom and pan only respond while the turkey waits on the band
    #[inline]
    pub fn pointer_control_enabled(&self) -> bool {
        self.phase == FlightPhase::Attached
    }

    /// The pointer let go of `body`.
    ///
    /// Launches when `body` is the turkey sitting on the band: the impulse
    /// points from the turkey back through the anchor, proportional to the
    /// stretch. Anything else is ignored.
    pub fn release<P: Physics>(&mut self, body: BodyId, physics: &mut P, tuning: &Tuning) -> Option<SlingEvent> {
        if body != self.projectile || self.phase != FlightPhase::Attached {
            return None;
        }
        let snap = physics.body(body)?;

        let impulse = (self.elastic.anchor - snap.pos) * tuning.launch_impulse_scale;
        physics.apply_impulse(body, impulse);
        self.elastic.detach();
        physics.set_elastic(None);
        self.phase = FlightPhase::InFlight;
        self.slow_ticks = 0;
        self.last_seen = snap.pos;

        log::info!(
            "Launched from ({:.0}, {:.0}) with impulse ({:.0}, {:.0})",
            snap.pos.x,
            snap.pos.y,
            impulse.x,
            impulse.y
        );
        Some(SlingEvent::Launched { impulse })
    }

    /// Advance one tick: detect the landing, or run down the respawn timer
    pub fn update<P: Physics>(&mut self, physics: &mut P, level: &LevelLayout, tuning: &Tuning) -> Option<SlingEvent> {
        match self.phase {
            FlightPhase::Attached => None,
            FlightPhase::InFlight => {
                let reason = self.check_landing(physics, level, tuning)?;
                self.phase = FlightPhase::PendingReset {
                    ticks_remaining: tuning.respawn_delay_ticks(),
                };
                log::info!(
                    "Landed at ({:.0}, {:.0}): {:?}, respawn in {} ms",
                    self.last_seen.x,
                    self.last_seen.y,
                    reason,
                    tuning.respawn_delay_ms
                );
                Some(SlingEvent::Landed {
                    at: self.last_seen,
                    reason,
                })
            }
            FlightPhase::PendingReset { ticks_remaining } => {
                let ticks_remaining = ticks_remaining.saturating_sub(1);
                if ticks_remaining > 0 {
                    self.phase = FlightPhase::PendingReset { ticks_remaining };
                    return None;
                }
                Some(self.respawn(physics, level, tuning))
            }
        }
    }

    fn check_landing<P: Physics>(&mut self, physics: &P, level: &LevelLayout, tuning: &Tuning) -> Option<LandingReason> {
        let Some(snap) = physics.body(self.projectile) else {
            return Some(LandingReason::Lost);
        };
        self.last_seen = snap.pos;

        if snap.bottom > level.ground_level + level.viewport.height {
            return Some(LandingReason::Lost);
        }
        if has_landed(&snap, level.ground_level, tuning) {
            return Some(LandingReason::Grounded);
        }

        if snap.speed() < tuning.landing_speed {
            self.slow_ticks += 1;
            if self.slow_ticks >= tuning.rest_timeout_ticks() {
                return Some(LandingReason::Stalled);
            }
        } else {
            self.slow_ticks = 0;
        }
        None
    }

    fn respawn<P: Physics>(&mut self, physics: &mut P, level: &LevelLayout, tuning: &Tuning) -> SlingEvent {
        physics.remove_body(self.projectile);
        self.projectile = physics.add_body(&level.projectile(tuning));
        self.elastic.attach(self.projectile);
        physics.set_elastic(self.elastic.link());
        self.phase = FlightPhase::Attached;
        self.slow_ticks = 0;
        self.last_seen = level.spawn;

        log::info!("Respawned turkey {:?}", self.projectile);
        SlingEvent::Respawned {
            projectile: self.projectile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Skin;
    use crate::physics::fake::FakePhysics;
    use crate::sim::level::build_level;
    use crate::sim::state::Viewport;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Fixture {
        physics: FakePhysics,
        level: LevelLayout,
        tuning: Tuning,
        sling: Sling,
        block: BodyId,
    }

    fn fixture() -> Fixture {
        let tuning = Tuning::default();
        let level = build_level(Viewport::new(1000.0, 800.0), &tuning, &mut Pcg32::seed_from_u64(1));
        let mut physics = FakePhysics::new();
        let ids = level.populate(&mut physics, &tuning);
        let sling = Sling::new(&mut physics, &level, &tuning);
        Fixture {
            physics,
            level,
            tuning,
            sling,
            block: ids[ids.len() - 1],
        }
    }

    fn turkeys(physics: &FakePhysics) -> usize {
        physics.bodies.values().filter(|b| b.desc.skin == Skin::Turkey).count()
    }

    /// Pull the turkey to `to` with the pointer and let go
    fn pull_and_release(f: &mut Fixture, to: Vec2) -> Option<SlingEvent> {
        let grabbed = f.physics.begin_drag(f.level.spawn)?;
        f.physics.drag_to(to);
        let released = f.physics.end_drag()?;
        assert_eq!(grabbed, released);
        f.sling.release(released, &mut f.physics, &f.tuning)
    }

    fn snapshot(bottom: f32, speed: f32) -> BodySnapshot {
        BodySnapshot {
            pos: Vec2::new(0.0, bottom - 21.0),
            vel: Vec2::new(speed, 0.0),
            angle: 0.0,
            mass: 1.0,
            bottom,
        }
    }

    #[test]
    fn test_new_attaches_band() {
        let f = fixture();
        assert_eq!(f.sling.phase(), FlightPhase::Attached);
        assert!(!f.sling.is_launched());
        assert!(f.sling.pointer_control_enabled());
        assert_eq!(f.sling.elastic().body, Some(f.sling.projectile()));
        assert_eq!(f.sling.elastic().anchor, Vec2::new(400.0, 320.0));
        assert_eq!(f.physics.elastic.map(|l| l.body), Some(f.sling.projectile()));
        assert_eq!(turkeys(&f.physics), 1);
    }

    #[test]
    fn test_pull_and_release_launches_up_and_right() {
        let mut f = fixture();
        let event = pull_and_release(&mut f, Vec2::new(350.0, 380.0));

        let Some(SlingEvent::Launched { impulse }) = event else {
            panic!("expected launch, got {event:?}");
        };
        assert!(impulse.x > 0.0);
        assert!(impulse.y < 0.0);
        assert_eq!(impulse, Vec2::new(50.0, -60.0) * f.tuning.launch_impulse_scale);
        assert!(f.sling.is_launched());
        assert!(!f.sling.pointer_control_enabled());
        assert_eq!(f.sling.elastic().body, None);
        assert!(!f.sling.elastic().visible);
        assert!(f.physics.elastic.is_none());
        assert_eq!(f.physics.impulses.len(), 1);
    }

    #[test]
    fn test_release_other_body_is_noop() {
        let mut f = fixture();
        let block = f.block;
        assert!(f.sling.release(block, &mut f.physics, &f.tuning).is_none());
        assert!(!f.sling.is_launched());
        assert!(f.physics.impulses.is_empty());
        assert!(f.physics.elastic.is_some());
    }

    #[test]
    fn test_double_release_launches_once() {
        let mut f = fixture();
        assert!(pull_and_release(&mut f, Vec2::new(350.0, 380.0)).is_some());

        let turkey = f.sling.projectile();
        assert!(f.sling.release(turkey, &mut f.physics, &f.tuning).is_none());
        assert!(f.sling.is_launched());
        assert_eq!(f.physics.impulses.len(), 1);
    }

    #[test]
    fn test_attached_ignores_landing() {
        let mut f = fixture();
        let turkey = f.sling.projectile();
        f.physics.place(turkey, Vec2::new(400.0, 729.0), Vec2::ZERO);
        assert!(f.sling.update(&mut f.physics, &f.level, &f.tuning).is_none());
        assert_eq!(f.sling.phase(), FlightPhase::Attached);
    }

    #[test]
    fn test_landing_then_respawn_after_delay() {
        let mut f = fixture();
        pull_and_release(&mut f, Vec2::new(350.0, 380.0));
        let old = f.sling.projectile();

        // Resting on the ground: bottom = 729 + 21 = ground level
        f.physics.place(old, Vec2::new(1800.0, 729.0), Vec2::ZERO);
        let event = f.sling.update(&mut f.physics, &f.level, &f.tuning);
        assert_eq!(
            event,
            Some(SlingEvent::Landed {
                at: Vec2::new(1800.0, 729.0),
                reason: LandingReason::Grounded,
            })
        );
        assert!(!f.sling.is_launched());
        assert_eq!(f.sling.phase(), FlightPhase::PendingReset { ticks_remaining: 180 });

        for _ in 0..179 {
            assert!(f.sling.update(&mut f.physics, &f.level, &f.tuning).is_none());
        }
        assert_eq!(f.sling.phase(), FlightPhase::PendingReset { ticks_remaining: 1 });

        let event = f.sling.update(&mut f.physics, &f.level, &f.tuning);
        let Some(SlingEvent::Respawned { projectile }) = event else {
            panic!("expected respawn, got {event:?}");
        };
        assert_ne!(projectile, old);
        assert!(f.physics.body(old).is_none());
        assert_eq!(turkeys(&f.physics), 1);
        assert_eq!(f.physics.body(projectile).map(|b| b.pos), Some(f.level.spawn));
        assert_eq!(f.sling.elastic().body, Some(projectile));
        assert!(f.sling.elastic().visible);
        assert_eq!(f.physics.elastic.map(|l| l.body), Some(projectile));
        assert_eq!(f.sling.phase(), FlightPhase::Attached);
    }

    #[test]
    fn test_release_during_pending_reset_does_not_launch() {
        let mut f = fixture();
        pull_and_release(&mut f, Vec2::new(350.0, 380.0));
        let turkey = f.sling.projectile();
        f.physics.place(turkey, Vec2::new(1800.0, 729.0), Vec2::ZERO);
        f.sling.update(&mut f.physics, &f.level, &f.tuning);

        f.physics.place(turkey, Vec2::new(1800.0, 700.0), Vec2::ZERO);
        f.physics.begin_drag(Vec2::new(1800.0, 700.0));
        let released = f.physics.end_drag();
        assert_eq!(released, Some(turkey));
        assert!(f.sling.release(turkey, &mut f.physics, &f.tuning).is_none());
        assert!(matches!(f.sling.phase(), FlightPhase::PendingReset { .. }));
        assert_eq!(f.physics.impulses.len(), 1);
    }

    #[test]
    fn test_fast_on_ground_keeps_flying() {
        let mut f = fixture();
        pull_and_release(&mut f, Vec2::new(350.0, 380.0));
        let turkey = f.sling.projectile();
        f.physics.place(turkey, Vec2::new(1800.0, 729.0), Vec2::new(300.0, 0.0));
        assert!(f.sling.update(&mut f.physics, &f.level, &f.tuning).is_none());
        assert!(f.sling.is_launched());
    }

    #[test]
    fn test_stalled_on_a_crate() {
        let mut f = fixture();
        pull_and_release(&mut f, Vec2::new(350.0, 380.0));
        let turkey = f.sling.projectile();
        f.physics.place(turkey, Vec2::new(2600.0, 500.0), Vec2::new(5.0, 0.0));

        for _ in 0..119 {
            assert!(f.sling.update(&mut f.physics, &f.level, &f.tuning).is_none());
        }
        let event = f.sling.update(&mut f.physics, &f.level, &f.tuning);
        assert!(matches!(
            event,
            Some(SlingEvent::Landed {
                reason: LandingReason::Stalled,
                ..
            })
        ));
    }

    #[test]
    fn test_speeding_up_resets_stall_count() {
        let mut f = fixture();
        pull_and_release(&mut f, Vec2::new(350.0, 380.0));
        let turkey = f.sling.projectile();

        f.physics.place(turkey, Vec2::new(2600.0, 500.0), Vec2::ZERO);
        for _ in 0..100 {
            f.sling.update(&mut f.physics, &f.level, &f.tuning);
        }
        f.physics.place(turkey, Vec2::new(2600.0, 500.0), Vec2::new(0.0, 200.0));
        f.sling.update(&mut f.physics, &f.level, &f.tuning);
        f.physics.place(turkey, Vec2::new(2600.0, 500.0), Vec2::ZERO);
        for _ in 0..100 {
            assert!(f.sling.update(&mut f.physics, &f.level, &f.tuning).is_none());
        }
    }

    #[test]
    fn test_vanished_projectile_counts_as_lost() {
        let mut f = fixture();
        pull_and_release(&mut f, Vec2::new(350.0, 380.0));
        let turkey = f.sling.projectile();
        f.physics.place(turkey, Vec2::new(900.0, 200.0), Vec2::new(100.0, 0.0));
        f.sling.update(&mut f.physics, &f.level, &f.tuning);
        f.physics.remove_body(turkey);

        let event = f.sling.update(&mut f.physics, &f.level, &f.tuning);
        assert_eq!(
            event,
            Some(SlingEvent::Landed {
                at: Vec2::new(900.0, 200.0),
                reason: LandingReason::Lost,
            })
        );
    }

    #[test]
    fn test_fell_through_the_floor_counts_as_lost() {
        let mut f = fixture();
        pull_and_release(&mut f, Vec2::new(350.0, 380.0));
        let turkey = f.sling.projectile();
        f.physics.place(turkey, Vec2::new(900.0, 2000.0), Vec2::new(0.0, 900.0));
        assert!(matches!(
            f.sling.update(&mut f.physics, &f.level, &f.tuning),
            Some(SlingEvent::Landed {
                reason: LandingReason::Lost,
                ..
            })
        ));
    }

    #[test]
    fn test_hovering_just_above_ground_not_landed() {
        let tuning = Tuning::default();
        assert!(!has_landed(&snapshot(749.8, 0.0), 750.0, &tuning));
        assert!(has_landed(&snapshot(750.0, 0.0), 750.0, &tuning));
    }

    proptest! {
        #[test]
        fn prop_fast_body_never_landed(bottom in 0.0f32..2000.0, speed in 60.0f32..5000.0) {
            let tuning = Tuning::default();
            prop_assert!(!has_landed(&snapshot(bottom, speed), 750.0, &tuning));
        }

        #[test]
        fn prop_airborne_body_never_landed(bottom in -1000.0f32..749.999, speed in 0.0f32..59.9) {
            let tuning = Tuning::default();
            prop_assert!(!has_landed(&snapshot(bottom, speed), 750.0, &tuning));
        }

        #[test]
        fn prop_slow_grounded_body_landed(bottom in 750.0f32..800.0, speed in 0.0f32..59.9) {
            let tuning = Tuning::default();
            prop_assert!(has_landed(&snapshot(bottom, speed), 750.0, &tuning));
        }
    }
}
