//! Procedural mesh builders.
//!
//! Every builder is deterministic and returns a fresh, not yet uploaded
//! [`StaticMesh`](crate::resources::mesh::StaticMesh).

pub mod box_shape;
pub mod cylinder;
pub mod plane;
pub mod sphere;

pub use box_shape::{create_cuboid, create_sharp_cuboid};
pub use cylinder::{create_cone, create_cylinder};
pub use plane::{HeightmapRegion, PlaneOptions, TerrainOptions, create_plane, create_terrain};
pub use sphere::{SphereOptions, create_sphere};
