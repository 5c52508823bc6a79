// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};

/// Axis-aligned bounding box of a path.
///
/// Coordinates are 16-bit and unsigned. The producer is responsible for
/// keeping `top <= bottom` and `left <= right`; nothing here checks it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PathBbox {
    pub top: u16,
    pub left: u16,
    pub bottom: u16,
    pub right: u16,
}

/// Packed form of a [`PathBbox`], as stored in the path buffer.
///
/// `word0 = top << 16 | left`, `word1 = bottom << 16 | right`.
///
/// This must be kept in sync with the decode step in `shader/bin_count.wgsl`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Zeroable, Pod)]
#[repr(C)]
pub struct PackedBbox {
    words: [u32; 2],
}

impl PathBbox {
    pub const fn new(top: u16, left: u16, bottom: u16, right: u16) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Creates a bounding box from wide extents.
    ///
    /// Extents above `u16::MAX` are truncated to their low 16 bits, matching
    /// what the packed layout can hold.
    pub fn from_extents(top: u32, left: u32, bottom: u32, right: u32) -> Self {
        Self {
            top: top as u16,
            left: left as u16,
            bottom: bottom as u16,
            right: right as u16,
        }
    }

    pub fn width(&self) -> u16 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u16 {
        self.bottom.saturating_sub(self.top)
    }

    /// Returns true if the box has zero width or zero height.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pack(self) -> PackedBbox {
        PackedBbox {
            words: [
                (self.top as u32) << 16 | self.left as u32,
                (self.bottom as u32) << 16 | self.right as u32,
            ],
        }
    }
}

impl PackedBbox {
    pub const fn new(word0: u32, word1: u32) -> Self {
        Self {
            words: [word0, word1],
        }
    }

    pub fn words(self) -> (u32, u32) {
        (self.words[0], self.words[1])
    }

    pub fn unpack(self) -> PathBbox {
        let [word0, word1] = self.words;
        PathBbox {
            top: (word0 >> 16) as u16,
            left: (word0 & 0xffff) as u16,
            bottom: (word1 >> 16) as u16,
            right: (word1 & 0xffff) as u16,
        }
    }

    /// Reinterprets a flat word stream (two words per box) as packed boxes.
    ///
    /// A trailing odd word is ignored.
    pub fn from_words(words: &[u32]) -> Vec<PackedBbox> {
        words
            .chunks_exact(2)
            .map(|pair| PackedBbox::new(pair[0], pair[1]))
            .collect()
    }
}

impl From<PathBbox> for PackedBbox {
    fn from(bbox: PathBbox) -> Self {
        bbox.pack()
    }
}

impl From<PackedBbox> for PathBbox {
    fn from(packed: PackedBbox) -> Self {
        packed.unpack()
    }
}
