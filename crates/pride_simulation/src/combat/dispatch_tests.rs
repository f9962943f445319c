//! Tests for attack dispatcher planning.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use crate::combat::dispatch::{
        plan_shots, shotgun_directions, signed_angle_from_reference, InvalidFireRequest, ShotPlan,
    };
    use crate::combat::{AttackKind, FireRequest};
    use crate::components::Side;
    use crate::config::CombatConfig;

    const EPS: f32 = 1e-5;

    fn request(kind: AttackKind, aim: Vec2) -> FireRequest {
        FireRequest::new(Vec2::new(2.0, -1.0), aim, Side::Player, kind)
    }

    fn angle_of(direction: Vec2) -> f32 {
        direction.y.atan2(direction.x)
    }

    #[test]
    fn test_straight_normalizes_aim() {
        let config = CombatConfig::default();
        let plan = plan_shots(&request(AttackKind::Straight, Vec2::new(3.0, 4.0)), &config).unwrap();

        let ShotPlan::Projectiles { directions, homing } = plan else {
            panic!("expected projectiles, got {:?}", plan);
        };
        assert!(!homing);
        assert_eq!(directions.len(), 1);
        assert!((directions[0] - Vec2::new(0.6, 0.8)).length() < EPS);
    }

    #[test]
    fn test_boss_straight_is_single_projectile() {
        let config = CombatConfig::default();
        let plan = plan_shots(&request(AttackKind::BossStraight, Vec2::NEG_Y), &config).unwrap();

        assert_eq!(
            plan,
            ShotPlan::Projectiles {
                directions: vec![Vec2::NEG_Y],
                homing: false
            }
        );
    }

    #[test]
    fn test_shotgun_spread_along_reference_axis() {
        let config = CombatConfig::default();
        let plan = plan_shots(&request(AttackKind::Shotgun, Vec2::new(1.0, 0.0)), &config).unwrap();

        let ShotPlan::Projectiles { directions, .. } = plan else {
            panic!("expected projectiles");
        };
        assert_eq!(directions.len(), 3);

        let base = signed_angle_from_reference(Vec2::X);
        assert!(base.abs() < EPS);

        let expected = [base - 0.2, base, base + 0.2];
        for (direction, angle) in directions.iter().zip(expected) {
            assert!((angle_of(*direction) - angle).abs() < EPS, "{:?} vs {}", direction, angle);
            assert!((direction.length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_shotgun_centered_on_any_aim() {
        let aim = Vec2::new(-1.0, 1.0).normalize();
        let directions = shotgun_directions(aim, 0.2);

        // Центральная дробинка = aim, крайние симметричны
        assert!((directions[1] - aim).length() < EPS);
        let left = directions[0].angle_to(aim);
        let right = aim.angle_to(directions[2]);
        assert!((left - 0.2).abs() < EPS);
        assert!((right - 0.2).abs() < EPS);
    }

    #[test]
    fn test_homing_plan_is_guided() {
        let config = CombatConfig::default();
        let plan = plan_shots(&request(AttackKind::Homing, Vec2::Y * 5.0), &config).unwrap();

        assert_eq!(
            plan,
            ShotPlan::Projectiles {
                directions: vec![Vec2::Y],
                homing: true
            }
        );
    }

    #[test]
    fn test_laser_plan_is_hitscan() {
        let config = CombatConfig::default();
        let plan = plan_shots(&request(AttackKind::Laser, Vec2::new(0.0, -2.0)), &config).unwrap();
        assert_eq!(plan, ShotPlan::HitScan { direction: Vec2::NEG_Y });
    }

    #[test]
    fn test_wave_is_inert() {
        let config = CombatConfig::default();
        assert_eq!(
            plan_shots(&request(AttackKind::Wave, Vec2::X), &config),
            Ok(ShotPlan::Inert)
        );
        assert_eq!(
            plan_shots(&request(AttackKind::Wave, Vec2::ZERO), &config),
            Ok(ShotPlan::Inert)
        );
    }

    #[test]
    fn test_zero_aim_rejected() {
        let config = CombatConfig::default();
        let err = plan_shots(&request(AttackKind::Straight, Vec2::ZERO), &config).unwrap_err();
        assert_eq!(err, InvalidFireRequest::DegenerateAim(Vec2::ZERO));
    }

    #[test]
    fn test_non_finite_origin_rejected() {
        let config = CombatConfig::default();
        let mut bad = request(AttackKind::Laser, Vec2::X);
        bad.origin = Vec2::new(f32::NAN, 0.0);
        assert!(matches!(
            plan_shots(&bad, &config),
            Err(InvalidFireRequest::NonFiniteOrigin(_))
        ));
    }
}
