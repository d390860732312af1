//! Bridge to an external effect dispatcher.
//!
//! Other effect systems (beams, decals, sprites the particle pool does not
//! know about) draw through the same renderer, from a camera and visibility
//! set of their own choosing. [`EffectsRenderer::draw_particles_external`]
//! installs that view for the duration of one callback and puts the previous
//! one back afterwards, however the callback exits.

use std::ops::{Deref, DerefMut};

use crate::renderer::EffectsRenderer;
use crate::view::{ViewContext, ViewParams};

/// An externally owned effect dispatcher.
pub trait EffectDispatch {
    /// Draw the dispatcher's effects for this frame.
    ///
    /// `trans_pass` is set when translucent effects are being drawn.
    fn draw_efx(&mut self, renderer: &mut EffectsRenderer, frametime: f32, trans_pass: bool);
}

impl<F> EffectDispatch for F
where
    F: FnMut(&mut EffectsRenderer, f32, bool),
{
    fn draw_efx(&mut self, renderer: &mut EffectsRenderer, frametime: f32, trans_pass: bool) {
        self(renderer, frametime, trans_pass)
    }
}

/// A temporarily replaced view.
///
/// The renderer's previous view is restored when the scope is dropped,
/// including during unwinding.
pub struct ViewScope<'a> {
    renderer: &'a mut EffectsRenderer,
    saved: Option<ViewContext>,
}

impl<'a> ViewScope<'a> {
    /// Install `view` on `renderer` until the scope ends.
    pub fn new(renderer: &'a mut EffectsRenderer, view: ViewContext) -> Self {
        let saved = std::mem::replace(&mut renderer.view, view);
        Self {
            renderer,
            saved: Some(saved),
        }
    }

    /// The view that will be restored.
    pub fn saved(&self) -> Option<&ViewContext> {
        self.saved.as_ref()
    }
}

impl Deref for ViewScope<'_> {
    type Target = EffectsRenderer;

    fn deref(&self) -> &Self::Target {
        self.renderer
    }
}

impl DerefMut for ViewScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.renderer
    }
}

impl Drop for ViewScope<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.renderer.view = saved;
        }
    }
}

impl EffectsRenderer {
    /// Run `dispatch` under the caller's view.
    ///
    /// The camera basis, matrices and frustum are rebuilt from `params`,
    /// `visbytes` becomes the visibility set and `frametime` the frame
    /// duration. The clock keeps its current time. The previous view is back
    /// in place when this returns or unwinds, so nested calls from inside
    /// `dispatch` each restore their own.
    pub fn draw_particles_external<D>(
        &mut self,
        params: &ViewParams,
        visbytes: &[u8],
        trans_pass: bool,
        frametime: f32,
        dispatch: &mut D,
    ) where
        D: EffectDispatch + ?Sized,
    {
        let view = ViewContext::from_params(params)
            .with_time(self.view.time, frametime)
            .with_visbytes(visbytes);

        let mut scope = ViewScope::new(self, view);
        log::trace!("Dispatching external effects (trans_pass: {})", trans_pass);
        dispatch.draw_efx(&mut scope, frametime, trans_pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TextureId;
    use crate::renderer::EffectTextures;
    use glam::Vec3;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn renderer() -> EffectsRenderer {
        let view = ViewContext::default()
            .with_time(5.0, 0.02)
            .with_visbytes(&[0b1010]);
        EffectsRenderer::new(
            view,
            EffectTextures {
                particle: TextureId(1),
                tracer: TextureId(2),
            },
        )
    }

    fn params(x: f32) -> ViewParams {
        ViewParams {
            origin: Vec3::new(x, 0.0, 0.0),
            angles: Vec3::new(0.0, 90.0, 0.0),
            ..ViewParams::default()
        }
    }

    #[test]
    fn test_view_applied_then_restored() {
        let mut renderer = renderer();
        let before = renderer.view().clone();
        let mut seen = None;

        renderer.draw_particles_external(
            &params(64.0),
            &[0xff],
            true,
            0.05,
            &mut |r: &mut EffectsRenderer, frametime: f32, trans: bool| {
                seen = Some((r.view().clone(), frametime, trans));
            },
        );

        let (inner, frametime, trans) = seen.unwrap();
        assert_eq!(inner.origin, Vec3::new(64.0, 0.0, 0.0));
        assert!((inner.forward - Vec3::Y).length() < 1e-5);
        assert_eq!(inner.visbytes, vec![0xff]);
        assert_eq!(inner.frametime, 0.05);
        assert_eq!(inner.time, 5.0);
        assert_eq!(frametime, 0.05);
        assert!(trans);

        assert_eq!(renderer.view(), &before);
    }

    #[test]
    fn test_nested_calls_restore_their_own_view() {
        let mut renderer = renderer();
        let before = renderer.view().clone();

        renderer.draw_particles_external(
            &params(10.0),
            &[1],
            false,
            0.1,
            &mut |r: &mut EffectsRenderer, _: f32, _: bool| {
                let outer = r.view().clone();
                r.draw_particles_external(
                    &params(20.0),
                    &[2],
                    false,
                    0.2,
                    &mut |inner: &mut EffectsRenderer, _: f32, _: bool| {
                        assert_eq!(inner.view().origin.x, 20.0);
                    },
                );
                assert_eq!(r.view(), &outer);
            },
        );

        assert_eq!(renderer.view(), &before);
    }

    #[test]
    fn test_restored_when_dispatch_panics() {
        let mut renderer = renderer();
        let before = renderer.view().clone();

        let result = catch_unwind(AssertUnwindSafe(|| {
            renderer.draw_particles_external(
                &params(30.0),
                &[],
                false,
                0.1,
                &mut |_: &mut EffectsRenderer, _: f32, _: bool| panic!("effect failed"),
            );
        }));

        assert!(result.is_err());
        assert_eq!(renderer.view(), &before);
    }

    #[test]
    fn test_scope_guard_restores_on_drop() {
        let mut renderer = renderer();
        let before = renderer.view().clone();
        {
            let mut scope = ViewScope::new(&mut renderer, ViewContext::from_params(&params(1.0)));
            assert_eq!(scope.saved(), Some(&before));
            scope.set_time(9.0, 0.5);
            assert_eq!(scope.view().time, 9.0);
        }
        assert_eq!(renderer.view(), &before);
    }
}
