//! Ownership release for streamed world pieces
//!
//! Streamers own everything they create. When a piece leaves the window the
//! streamer calls [`Release::release`] on it, which walks the piece's own
//! children, then hands the released value to the caller so the renderer
//! can free whatever GPU state it attached.

pub trait Release {
    /// Release this node and every node it owns
    fn release(&mut self);

    fn is_released(&self) -> bool;
}

/// Release every node in `nodes`
pub fn release_all<'a, T, I>(nodes: I)
where
    T: Release + 'a,
    I: IntoIterator<Item = &'a mut T>,
{
    for node in nodes {
        node.release();
    }
}
