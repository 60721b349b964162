//! Core-Domänentypen: Schlüssel, Topologie-Graph, Pfade, Weld-Arbeitsstand.

pub mod paths;
pub mod quantize;
pub mod selection;
pub mod topology;
pub mod weld;

pub use paths::{extract_paths_from_component, pinned_keys, LoopTypeOverride, Path};
pub use quantize::{QuantizedKey, Quantizer, Tolerances};
pub use selection::{ContainerSnapshot, LoopRecord, PositionUpdate, SelectedEdge, UvHandle, VertexId};
pub use topology::{Adjacency, TopologyGraph};
pub use weld::{UvWorkspace, WeldIndex};
