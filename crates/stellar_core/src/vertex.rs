use bytemuck::{Pod, Zeroable};

use crate::state::ParticleState;

/// Per-particle record a renderer uploads once per frame.
/// Must be repr(C) and Pod so a whole frame casts to one byte slice.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RenderVertex {
    pub position: [f32; 3],
    pub mass: f32,
    pub color: [f32; 3],
    /// ParticleKind discriminant
    pub kind: u32,
}

impl RenderVertex {
    pub fn from_state(state: &ParticleState) -> Vec<RenderVertex> {
        state
            .positions()
            .iter()
            .zip(state.masses())
            .zip(state.colors())
            .zip(state.kinds())
            .map(|(((position, mass), color), kind)| RenderVertex {
                position: *position,
                mass: *mass,
                color: *color,
                kind: *kind as u32,
            })
            .collect()
    }

    pub fn as_bytes(vertices: &[RenderVertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Particle;
    use crate::types::ParticleKind;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<RenderVertex>(), 32);

        let mut state = ParticleState::new();
        state.push(Particle {
            position: [1.0, 2.0, 3.0],
            velocity: [0.0; 3],
            mass: 4.0,
            kind: ParticleKind::BlackHole,
            color: [0.8, 0.2, 0.8],
        });
        let vertices = RenderVertex::from_state(&state);
        assert_eq!(vertices[0].kind, 2);
        assert_eq!(vertices[0].mass, 4.0);
        assert_eq!(RenderVertex::as_bytes(&vertices).len(), 32);
    }
}
