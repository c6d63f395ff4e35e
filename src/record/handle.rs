use crate::foundation::core::{Point, TimeWindow, Vec3};

/// Draggable 2D control point exposed to an editor while its window is active.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Handle2D {
    /// Script-chosen identifier.
    pub id: String,
    /// Virtual-time window during which the handle is shown.
    pub window: TimeWindow,
    /// Screen-space position.
    pub position: Point,
}

/// Draggable 3D control point exposed to an editor while its window is active.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Handle3D {
    /// Script-chosen identifier.
    pub id: String,
    /// Virtual-time window during which the handle is shown.
    pub window: TimeWindow,
    /// World-space position.
    pub position: Vec3,
}

/// Reference to an open handle, returned by `begin_handle_*` and consumed by `end_handle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKey {
    /// Index into the 2D handle list.
    Planar(usize),
    /// Index into the 3D handle list.
    Spatial(usize),
}

/// Handles recorded during one bake, in creation order.
#[derive(Debug, Default)]
pub(crate) struct HandleBook {
    planar: Vec<(Handle2D, bool)>,
    spatial: Vec<(Handle3D, bool)>,
}

impl HandleBook {
    pub(crate) fn open_2d(&mut self, id: String, position: Point, now: f64) -> HandleKey {
        let window = TimeWindow {
            start: now,
            end: f64::INFINITY,
        };
        self.planar.push((
            Handle2D {
                id,
                window,
                position,
            },
            true,
        ));
        HandleKey::Planar(self.planar.len() - 1)
    }

    pub(crate) fn open_3d(&mut self, id: String, position: Vec3, now: f64) -> HandleKey {
        let window = TimeWindow {
            start: now,
            end: f64::INFINITY,
        };
        self.spatial.push((
            Handle3D {
                id,
                window,
                position,
            },
            true,
        ));
        HandleKey::Spatial(self.spatial.len() - 1)
    }

    /// Close an open handle. Returns `false` if the key is unknown or already closed.
    pub(crate) fn close(&mut self, key: HandleKey, now: f64) -> bool {
        let slot = match key {
            HandleKey::Planar(i) => self.planar.get_mut(i).map(|(h, open)| (&mut h.window, open)),
            HandleKey::Spatial(i) => self.spatial.get_mut(i).map(|(h, open)| (&mut h.window, open)),
        };
        match slot {
            Some((window, open)) if *open => {
                window.end = now;
                *open = false;
                true
            }
            _ => false,
        }
    }

    /// Close every still-open handle at `now` and hand out the lists.
    pub(crate) fn finish(self, now: f64) -> (Vec<Handle2D>, Vec<Handle3D>) {
        let planar = self
            .planar
            .into_iter()
            .map(|(mut h, open)| {
                if open {
                    h.window.end = now;
                }
                h
            })
            .collect();
        let spatial = self
            .spatial
            .into_iter()
            .map(|(mut h, open)| {
                if open {
                    h.window.end = now;
                }
                h
            })
            .collect();
        (planar, spatial)
    }
}
