use xxhash_rust::xxh3::Xxh3;

use crate::audio::mix::{SoundSample, SoundTrack};
use crate::foundation::core::{Fps, Point, TimeWindow, Vec3};
use crate::record::command::{Command, CommandKind, EntitySnapshot, PropertyValue};
use crate::record::handle::{Handle2D, Handle3D};

const XXH3_SEED: u64 = 0x3c1f_9a7e_52d4_b806;

/// Stable 128-bit digest of a baked artifact.
///
/// Two bakes of the same behavior with the same options produce equal fingerprints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl std::fmt::Display for ArtifactFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

pub(crate) fn fingerprint_parts(
    fps: Fps,
    commands: &[Command],
    handles_2d: &[Handle2D],
    handles_3d: &[Handle3D],
    track: &SoundTrack,
) -> ArtifactFingerprint {
    let mut h = StableHasher::new();
    h.write_u32(fps.num);
    h.write_u32(fps.den);

    h.write_len(commands.len());
    for cmd in commands {
        write_command(&mut h, cmd);
    }

    h.write_len(handles_2d.len());
    for handle in handles_2d {
        h.write_str(&handle.id);
        write_window(&mut h, handle.window);
        write_point(&mut h, handle.position);
    }
    h.write_len(handles_3d.len());
    for handle in handles_3d {
        h.write_str(&handle.id);
        write_window(&mut h, handle.window);
        write_vec3(&mut h, handle.position);
    }

    h.write_u32(track.sample_rate);
    h.write_len(track.channel_count());
    for ch in 0..track.channel_count() {
        write_pcm(&mut h, track.channel(ch).unwrap_or_default());
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_len(&mut self, v: usize) {
        self.write_u64(v as u64);
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_len(s.len());
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> ArtifactFingerprint {
        let v = self.inner.digest128();
        ArtifactFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_point(h: &mut StableHasher, p: Point) {
    h.write_f64(p.x);
    h.write_f64(p.y);
}

fn write_vec3(h: &mut StableHasher, v: Vec3) {
    h.write_f64(v.x);
    h.write_f64(v.y);
    h.write_f64(v.z);
}

fn write_window(h: &mut StableHasher, w: TimeWindow) {
    h.write_f64(w.start);
    h.write_f64(w.end);
}

fn write_pcm(h: &mut StableHasher, pcm: &[i16]) {
    h.write_len(pcm.len());
    for s in pcm {
        h.write_bytes(&s.to_le_bytes());
    }
}

fn write_value(h: &mut StableHasher, v: &PropertyValue) {
    match v {
        PropertyValue::Number(n) => {
            h.write_u8(0);
            h.write_f64(*n);
        }
        PropertyValue::Vec2(v) => {
            h.write_u8(1);
            h.write_f64(v.x);
            h.write_f64(v.y);
        }
        PropertyValue::Vec3(v) => {
            h.write_u8(2);
            write_vec3(h, *v);
        }
        PropertyValue::Color(c) => {
            h.write_u8(3);
            h.write_f32(c.r);
            h.write_f32(c.g);
            h.write_f32(c.b);
            h.write_f32(c.a);
        }
        PropertyValue::Text(s) => {
            h.write_u8(4);
            h.write_str(s);
        }
        PropertyValue::Enum(s) => {
            h.write_u8(5);
            h.write_str(s);
        }
        PropertyValue::Resource(key) => {
            h.write_u8(6);
            h.write_str(&key.0);
        }
    }
}

fn write_snapshot(h: &mut StableHasher, e: &EntitySnapshot) {
    h.write_u64(e.id.0);
    h.write_u8(e.kind as u8);
    h.write_len(e.properties.len());
    for (name, value) in &e.properties {
        h.write_str(name);
        write_value(h, value);
    }
    h.write_f64(e.absorb);
}

fn write_sample(h: &mut StableHasher, s: &SoundSample) {
    h.write_str(&s.name);
    h.write_u32(s.sample_rate);
    h.write_len(s.channel_count());
    for ch in 0..s.channel_count() {
        write_pcm(h, s.channel(ch));
    }
}

fn write_command(h: &mut StableHasher, cmd: &Command) {
    h.write_f64(cmd.time);
    h.write_str(cmd.kind.name());
    match &cmd.kind {
        CommandKind::Create { entity } => write_snapshot(h, entity),
        CommandKind::Destroy {
            entity_id,
            snapshot,
        } => {
            h.write_u64(entity_id.0);
            write_snapshot(h, snapshot);
        }
        CommandKind::SetProperty {
            entity_id,
            property,
            old_value,
            new_value,
        } => {
            h.write_u64(entity_id.0);
            h.write_str(property);
            write_value(h, old_value);
            write_value(h, new_value);
        }
        CommandKind::SetPropertyBatch {
            entity_ids,
            property,
            old_values,
            new_value,
        } => {
            h.write_len(entity_ids.len());
            for (id, old) in entity_ids.iter().zip(old_values) {
                h.write_u64(id.0);
                write_value(h, old);
            }
            h.write_str(property);
            write_value(h, new_value);
        }
        CommandKind::Absorb {
            entity_id,
            old_progress,
            new_progress,
            absorb_point,
            absorb_screen_point,
        } => {
            h.write_u64(entity_id.0);
            h.write_f64(*old_progress);
            h.write_f64(*new_progress);
            h.write_bool(absorb_point.is_some());
            if let Some(p) = absorb_point {
                write_vec3(h, *p);
            }
            h.write_bool(absorb_screen_point.is_some());
            if let Some(p) = absorb_screen_point {
                write_point(h, *p);
            }
        }
        CommandKind::SetActiveCamera {
            new_camera,
            old_camera,
        } => {
            for cam in [new_camera, old_camera] {
                h.write_bool(cam.is_some());
                if let Some(id) = cam {
                    h.write_u64(id.0);
                }
            }
        }
        CommandKind::PlaySound { sample, volume } => {
            write_sample(h, sample);
            h.write_f32(*volume);
        }
        CommandKind::CreateRenderBuffer { id, width, height } => {
            h.write_u32(id.0);
            h.write_u32(*width);
            h.write_u32(*height);
        }
        CommandKind::End => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/fingerprint.rs"]
mod tests;
