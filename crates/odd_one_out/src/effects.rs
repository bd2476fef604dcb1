use bevy::prelude::*;

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (animate_fades, animate_scales, expire_lifetimes));
    }
}

/// Animates the sprite alpha, removed once done
#[derive(Component, Debug)]
pub struct Fade {
    timer: Timer,
    from: f32,
    to: f32,
}

impl Fade {
    pub fn new(seconds: f32, from: f32, to: f32) -> Self {
        Self {
            timer: Timer::from_seconds(seconds, TimerMode::Once),
            from,
            to,
        }
    }

    pub fn fade_in(seconds: f32) -> Self {
        Self::new(seconds, 0.0, 1.0)
    }

    pub fn fade_out(seconds: f32) -> Self {
        Self::new(seconds, 1.0, 0.0)
    }

    fn value(&self) -> f32 {
        (self.to - self.from).mul_add(self.timer.fraction(), self.from)
    }
}

/// Animates the uniform scale of the transform, removed once done
#[derive(Component, Debug)]
pub struct Pulse {
    timer: Timer,
    from: f32,
    to: f32,
}

impl Pulse {
    pub fn new(seconds: f32, from: f32, to: f32) -> Self {
        Self {
            timer: Timer::from_seconds(seconds, TimerMode::Once),
            from,
            to,
        }
    }

    fn value(&self) -> f32 {
        (self.to - self.from).mul_add(self.timer.fraction(), self.from)
    }
}

/// Despawns the entity when the timer runs out
#[derive(Component, Debug)]
pub struct Lifetime(pub Timer);

impl Lifetime {
    pub fn from_seconds(seconds: f32) -> Self {
        Self(Timer::from_seconds(seconds, TimerMode::Once))
    }
}

fn animate_fades(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Fade, &mut Sprite)>,
) {
    for (entity, mut fade, mut sprite) in &mut query {
        fade.timer.tick(time.delta());
        sprite.color.set_alpha(fade.value());
        if fade.timer.finished() {
            commands.entity(entity).remove::<Fade>();
        }
    }
}

fn animate_scales(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Pulse, &mut Transform)>,
) {
    for (entity, mut pulse, mut transform) in &mut query {
        pulse.timer.tick(time.delta());
        let scale = pulse.value();
        transform.scale = Vec3::new(scale, scale, 1.0);
        if pulse.timer.finished() {
            commands.entity(entity).remove::<Pulse>();
        }
    }
}

fn expire_lifetimes(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Lifetime)>,
) {
    for (entity, mut lifetime) in &mut query {
        if lifetime.0.tick(time.delta()).finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}
