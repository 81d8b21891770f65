use rand::Rng;
use crate::game::math::{fx, sign, FixedNum, FixedVec2};
use super::manager::{IndoorSteering, SteeringContext};

impl IndoorSteering {
    /// Aimless movement when there is nothing to seek.
    ///
    /// On foot inside a room the agent keeps clear of the side walls and stays
    /// put in cramped rooms; otherwise it drifts along a randomly perturbed
    /// heading, probing for obstacles while swimming.
    pub fn wander(
        &mut self,
        ctx: &SteeringContext,
        rng: &mut impl Rng,
        wall_avoid_distance: FixedNum,
        stay_still_in_tight_space: bool,
    ) {
        let body = ctx.body;
        let in_water = body.in_water;
        let avoid = wall_avoid_distance;
        let mut wander = false;

        match body.hull.and_then(|id| ctx.layout.hull(id)) {
            Some(hull) if !in_water => {
                let tight = (avoid * FixedNum::from_num(3)).max(ctx.config.small_room_size);
                if stay_still_in_tight_space && hull.width() < tight {
                    self.reset();
                } else {
                    let x = ctx.agent_world().x - ctx.layout.origin(hull.region).x;
                    let left = x - hull.min.x;
                    let right = hull.max.x - x;

                    if left < avoid && right < avoid {
                        if (right - left).abs() > avoid / FixedNum::from_num(2) {
                            self.steer_manual(FixedVec2::UNIT_X * sign(right - left));
                            return;
                        } else if stay_still_in_tight_space {
                            self.reset();
                            return;
                        }
                    }

                    if left < avoid {
                        let speed = ((avoid - left) / avoid).clamp(fx(0.25), FixedNum::ONE);
                        self.steer_manual(FixedVec2::UNIT_X * speed);
                        self.wander_heading = FixedVec2::UNIT_X;
                    } else if right < avoid {
                        let speed = ((avoid - right) / avoid).clamp(fx(0.25), FixedNum::ONE);
                        self.steer_manual(-FixedVec2::UNIT_X * speed);
                        self.wander_heading = -FixedVec2::UNIT_X;
                    } else {
                        wander = true;
                    }
                }
            }
            _ => wander = true,
        }

        if wander {
            self.steer_wander(ctx, rng);
            if in_water {
                self.steer_avoid(ctx, avoid);
            }
        }
        if !in_water {
            // Don't walk off ledges chasing a vertical heading
            self.steering.y = FixedNum::ZERO;
        }
    }

    fn steer_wander(&mut self, ctx: &SteeringContext, rng: &mut impl Rng) {
        let jitter = ctx.config.wander_jitter;
        let nudge = FixedVec2::new(
            fx(rng.random_range(-1.0f32..=1.0)),
            fx(rng.random_range(-1.0f32..=1.0)),
        ) * jitter;
        // Heading drifts around the full circle; walkers turn around once
        // it swings past vertical
        let mut heading = (self.wander_heading + nudge).normalize();
        if heading == FixedVec2::ZERO {
            heading = FixedVec2::UNIT_X;
        }
        self.wander_heading = heading;
        self.steering += heading;
    }

    /// Probes ahead along the steering direction and turns aside, or back,
    /// when something solid is within `look_ahead`.
    fn steer_avoid(&mut self, ctx: &SteeringContext, look_ahead: FixedNum) {
        let dir = self.steering.normalize();
        if dir == FixedVec2::ZERO {
            return;
        }
        let agent = ctx.agent_world();
        if ctx.layout.has_line_of_sight(agent, agent + dir * look_ahead) {
            return;
        }
        let escape = [dir.perp(), -dir.perp()]
            .into_iter()
            .find(|side| ctx.layout.has_line_of_sight(agent, agent + *side * look_ahead))
            .unwrap_or(-dir);
        self.steering += escape * FixedNum::from_num(2);
        self.wander_heading = escape;
    }
}
