// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input sockets of line nodes and the node types they accept.

use serde::{Deserialize, Serialize};

/// What a node provides to its parents, and what a socket accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketType {
    /// Line set node
    LineSet,
    /// Brush settings node
    BrushSettings,
    /// Brush detail node
    BrushDetail,
    /// Reduction settings node
    Reduction,
    /// Texture map node
    TextureMap,
}

/// An input socket, addressed by its identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socket {
    /// Socket identifier, also the name of the property it stands for
    pub identifier: String,
    /// Node type that may be linked in
    pub accepts: SocketType,
    /// Whether the socket holds an ordered list of links
    pub list: bool,
}

impl Socket {
    /// Socket holding at most one link
    pub fn single(identifier: impl Into<String>, accepts: SocketType) -> Self {
        Self {
            identifier: identifier.into(),
            accepts,
            list: false,
        }
    }

    /// Socket holding an ordered list of links
    pub fn list(identifier: impl Into<String>, accepts: SocketType) -> Self {
        Self {
            list: true,
            ..Self::single(identifier, accepts)
        }
    }

    /// Whether a node providing `output` may be linked here
    pub fn accepts(&self, output: Option<SocketType>) -> bool {
        output == Some(self.accepts)
    }
}
