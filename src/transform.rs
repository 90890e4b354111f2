use nalgebra_glm::{
    identity, inverse_transpose, rotate_normalized_axis, scale, translate, vec3, TMat4, TVec3,
};

use crate::animation::AnimationState;

/// Vertical lift applied per raised animation flag.
const LIFT: f32 = 0.25;

/// How an object is placed in the world: a base translation (optionally
/// following the body and head animation flags), then a rotation, then a
/// scale. Composition order is always translate, rotate, scale.
#[derive(Clone, Copy, Debug)]
pub struct TransformRecipe {
    pub translation: TVec3<f32>,
    pub follows_body: bool,
    pub follows_head: bool,
    pub rotation_degrees: f32,
    pub rotation_axis: TVec3<f32>,
    pub scale: TVec3<f32>,
}

impl TransformRecipe {
    pub fn still(translation: TVec3<f32>) -> Self {
        TransformRecipe {
            translation,
            follows_body: false,
            follows_head: false,
            rotation_degrees: 0.0,
            rotation_axis: vec3(1.0, 0.0, 0.0),
            scale: vec3(1.0, 1.0, 1.0),
        }
    }

    pub fn following_body(mut self) -> Self {
        self.follows_body = true;
        self
    }

    pub fn following_head(mut self) -> Self {
        self.follows_head = true;
        self
    }

    pub fn rotated(mut self, degrees: f32, axis: TVec3<f32>) -> Self {
        self.rotation_degrees = degrees;
        self.rotation_axis = axis;
        self
    }

    pub fn scaled(mut self, factors: TVec3<f32>) -> Self {
        self.scale = factors;
        self
    }

    /// Model matrix and its inverse-transpose for normals.
    pub fn matrices(&self, animation: &AnimationState) -> (TMat4<f32>, TMat4<f32>) {
        let mut offset = self.translation;
        if self.follows_body && animation.body_raised {
            offset += vec3(0.0, LIFT, 0.0);
        }
        if self.follows_head && animation.head_raised {
            offset += vec3(0.0, LIFT, 0.0);
        }

        let mut model: TMat4<f32> = identity();
        model = translate(&model, &offset);
        model = rotate_normalized_axis(
            &model,
            self.rotation_degrees.to_radians(),
            &self.rotation_axis,
        );
        model = scale(&model, &self.scale);

        (model, inverse_transpose(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_glm::{rotation, scaling, translation};

    fn assert_mat_eq(actual: &TMat4<f32>, expected: &TMat4<f32>) {
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (actual[(i, j)] - expected[(i, j)]).abs() < 1e-5,
                    "entry ({i},{j}): {} vs {}",
                    actual[(i, j)],
                    expected[(i, j)]
                );
            }
        }
    }

    #[test]
    fn composition_is_translate_rotate_scale() {
        let recipe = TransformRecipe::still(vec3(0.0, 0.25, 0.0))
            .rotated(90.0, vec3(0.0, 1.0, 0.0))
            .scaled(vec3(0.5, 1.0, 0.5));
        let (model, _) = recipe.matrices(&AnimationState::default());

        let expected = translation(&vec3(0.0, 0.25, 0.0))
            * rotation(90.0f32.to_radians(), &vec3(0.0, 1.0, 0.0))
            * scaling(&vec3(0.5, 1.0, 0.5));
        assert_mat_eq(&model, &expected);
    }

    #[test]
    fn raised_flags_lift_the_object() {
        let recipe = TransformRecipe::still(vec3(0.0, 1.0, 0.0))
            .following_body()
            .following_head();
        let raised = AnimationState {
            body_raised: true,
            head_raised: true,
        };

        let (still, _) = recipe.matrices(&AnimationState::default());
        let (lifted, _) = recipe.matrices(&raised);
        assert!((still[(1, 3)] - 1.0).abs() < 1e-6);
        assert!((lifted[(1, 3)] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn flags_are_ignored_unless_followed() {
        let recipe = TransformRecipe::still(vec3(0.0, 0.0, 0.0)).following_body();
        let head_only = AnimationState {
            body_raised: false,
            head_raised: true,
        };
        let (model, _) = recipe.matrices(&head_only);
        assert!((model[(1, 3)]).abs() < 1e-6);
    }
}
