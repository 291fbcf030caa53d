//! Screen payload capability.

/// A screen the host can render full-size.
///
/// The navigation graph never looks inside a screen; it only hands the active
/// one back to the host through [`NavigationGraph::render_active`].
///
/// [`NavigationGraph::render_active`]: super::NavigationGraph::render_active
pub trait Screen {
    /// What rendering produces for the host (a view handle, a JS value, ...).
    type Output;

    fn render(&self) -> Self::Output;
}

impl<T: Screen + ?Sized> Screen for Box<T> {
    type Output = T::Output;

    fn render(&self) -> Self::Output {
        (**self).render()
    }
}
