//! Headless симуляция боя
//!
//! Запускает Bevy App без рендера: игрок с партнёром против турели и
//! преследователя, ввод: заскриптованный.
//!
//! Usage: pride_simulation [combat.ron]

use bevy::prelude::*;
use pride_simulation::ai::{Chaser, DetectionRange, EnemyBrain, Turret};
use pride_simulation::player::{CharacterName, ChargeGauge, SpecialResource};
use pride_simulation::*;

const TICKS: u32 = 1000;

/// Заскриптованный ввод: (тик, событие)
const SCRIPT: &[(u32, PlayerInput)] = &[
    (10, PlayerInput::Move(Vec2::X)),
    (20, PlayerInput::FirePressed),
    (120, PlayerInput::DashPressed),
    (200, PlayerInput::Move(Vec2::ZERO)),
    (260, PlayerInput::StrafePressed),
    (270, PlayerInput::Move(Vec2::NEG_Y)),
    (330, PlayerInput::StrafeReleased),
    (400, PlayerInput::FireReleased),
    (420, PlayerInput::AreaAttack),
    (500, PlayerInput::SwitchCharacter),
    (520, PlayerInput::FirePressed),
    (900, PlayerInput::FireReleased),
];

fn main() {
    init_logger();

    let path = std::env::args().nth(1);
    let Ok(config) = load_config(path.as_deref()) else {
        std::process::exit(1);
    };

    let mut app = create_headless_app();
    app.add_plugins((SimulationPlugin, HeadlessMotionPlugin))
        .insert_resource(config)
        .insert_resource(SpecialResource::new(ChargeGauge::default().with_charges("Marisa", 1)));

    let world = app.world_mut();

    let leader = world
        .spawn((
            Combatant::new(10, AttackKind::Straight),
            Side::Player,
            Position(Vec2::ZERO),
            MoveSpeed(4.0),
            PlayerMotionState::default(),
            Controlled,
            CharacterName("Reimu".to_string()),
        ))
        .id();
    let partner = world
        .spawn((
            Combatant::new(10, AttackKind::Shotgun),
            Side::Player,
            Position(Vec2::new(-1.0, 0.0)),
            MoveSpeed(4.0),
            PlayerMotionState::default(),
            CharacterName("Marisa".to_string()),
        ))
        .id();
    world.insert_resource(Party::new(leader, Some(partner)));

    world.spawn((
        Combatant::new(6, AttackKind::Laser),
        Side::Enemy,
        Position(Vec2::new(6.0, 3.0)),
        EnemyBrain::new(Turret),
        DetectionRange(8.0),
    ));
    world.spawn((
        Combatant::new(4, AttackKind::Shotgun),
        Side::Enemy,
        Position(Vec2::new(7.0, -2.0)),
        MoveSpeed(1.5),
        EnemyBrain::new(Chaser::default()),
    ));

    log_info(&format!("Starting headless combat simulation ({} ticks)", TICKS));

    // Первый update: Time<Real> стартует с нулевой дельтой
    app.update();

    for tick in 0..TICKS {
        for (_, input) in SCRIPT.iter().filter(|(at, _)| *at == tick) {
            app.world_mut().send_event(*input);
        }

        app.update();

        if tick % 100 == 0 {
            let world = app.world_mut();
            let mut combatants = world.query::<(&Combatant, &Side)>();
            let (players, enemies) = combatants
                .iter(world)
                .fold((0, 0), |(players, enemies), (_, side)| match side {
                    Side::Player => (players + 1, enemies),
                    Side::Enemy => (players, enemies + 1),
                });
            let projectiles = world.query::<&Projectile>().iter(world).count();

            log_info(&format!(
                "Tick {}: {} players, {} enemies, {} projectiles in flight",
                tick, players, enemies, projectiles
            ));
        }
    }

    log_info("Simulation complete!");
}
