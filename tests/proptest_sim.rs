//! Property-based tests over random initial conditions.
//!
//! These verify the invariants that must hold for any configuration:
//! - No NaN/infinite positions after stepping
//! - Pinned point masses never move
//! - Particle counts are conserved

use proptest::prelude::*;
use softsim::{
    Cloth, ClothParams, Collider, Fluid, FluidParams, Orientation, StepTiming, Vec3,
};

const GRAVITY: Vec3 = Vec3::new(0.0, -9.8, 0.0);

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn cloth_state_stays_finite(
        num_width in 2usize..6,
        num_height in 2usize..6,
        thickness in 1e-3f32..0.05,
        damping in 0.0f32..5.0,
        seed in any::<u64>(),
        steps in 1usize..6,
    ) {
        let mut cloth = Cloth::new(
            1.0,
            1.0,
            num_width,
            num_height,
            thickness,
            Orientation::Vertical,
            &[(0, num_height - 1)],
            seed,
        );
        let params = ClothParams { damping, ..ClothParams::default() };
        let timing = StepTiming::new(60.0, 2.0);
        let floor = Collider::plane(Vec3::new(0.0, -2.0, 0.0), Vec3::Y, 0.2);

        for _ in 0..steps {
            cloth.step(timing, &params, &[GRAVITY], &[floor]);
        }

        for pm in &cloth.point_masses {
            prop_assert!(pm.position.is_finite(), "non-finite position {:?}", pm.position);
        }
        let pinned = cloth.point_mass(0, num_height - 1);
        prop_assert_eq!(pinned.position, pinned.start_position);
        prop_assert_eq!(cloth.point_masses.len(), num_width * num_height);
    }

    #[test]
    fn fluid_state_stays_finite(
        count in 1usize..40,
        seed in any::<u64>(),
        steps in 1usize..4,
    ) {
        let mut fluid = Fluid::new_random(
            count,
            Vec3::new(-0.5, 0.0, -1.0),
            Vec3::new(0.5, 0.5, 0.0),
            seed,
        );
        let timing = StepTiming::new(60.0, 1.0);
        let floor = Collider::plane(Vec3::new(0.0, -0.5, 0.0), Vec3::Y, 0.1);

        for _ in 0..steps {
            fluid.step(timing, &FluidParams::default(), &[GRAVITY], &[floor]);
        }

        for p in &fluid.particles {
            prop_assert!(p.position.is_finite(), "non-finite position {:?}", p.position);
            prop_assert!(p.velocity.is_finite(), "non-finite velocity {:?}", p.velocity);
            prop_assert!(p.density_est.is_finite());
        }
        prop_assert_eq!(fluid.particles.len(), count);
    }
}
