/// Document-level rendering hooks used while the scroll simulator is attached.
///
/// While attached, the host suppresses native scroll rendering and positions the document
/// itself from the virtual offset. Detaching restores native behaviour with no residual
/// transform.
pub trait ScrollSurface {
    fn set_native_scroll_suppressed(&mut self, suppressed: bool);

    /// Shift the document vertically by `y` (negative scrolls content up).
    fn translate_document(&mut self, y: f64);

    fn clear_document_translation(&mut self);
}
