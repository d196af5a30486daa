//! Framer Core - profile picture compositing engine
//!
//! This crate provides the engine behind the Framer editor: a user photo is
//! positioned, scaled and rotated beneath a frame overlay, previewed every
//! display refresh, and exported as a PNG.
//!
//! Input flows one way:
//!
//! ```text
//! pointer / touch / wheel / key / slider
//!     -> gesture::GestureInterpreter    (classify, emit Intent)
//!     -> history::TransformStore        (snapshot, then apply)
//!     -> compositor::Compositor         (read state each frame)
//!     -> export                         (read state on demand)
//! ```
//!
//! [`EditorSession`] wires these together and is what a host embeds. Nothing
//! here touches a browser API; the `framer-wasm` crate supplies the display
//! surface, the frame scheduler, storage and downloads.

pub mod asset;
pub mod color;
pub mod compositor;
pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod locale;
pub mod presets;
pub mod rate_limit;
pub mod session;
pub mod state;

pub use asset::{AssetHandle, AssetId, AssetKind, AssetLoader, ImageAsset, ResourceLedger};
pub use color::{dominant_color, Rgb};
pub use compositor::{CompositeFrame, Compositor, FrameScheduler, RenderLoop, Scene, SceneIdentity};
pub use config::{ConfigError, EditorConfig, TransformLimits};
pub use decode::{DecodeError, DecodedImage};
pub use encode::{encode_png, EncodeError};
pub use export::{export_composite, DownloadSink, ExportError, ExportedFile};
pub use geometry::{Point, Rect};
pub use gesture::{Change, GestureContext, GestureInterpreter, Intent, Key};
pub use history::{HistoryStack, TransformStore};
pub use locale::{KeyValueStore, Language, LocaleContext, MemoryStore, StorageError};
pub use presets::{default_presets, PresetFrame};
pub use rate_limit::RateLimiter;
pub use session::{ControlsState, EditorSession, LoadError};
pub use state::TransformState;
