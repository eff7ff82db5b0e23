// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dense multi-channel volumes.

use sightline_datamapper::{DataFormat, DataMapper};
use thiserror::Error;

/// A volume could not be built from the given samples.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VolumeError {
    /// The sample buffer does not hold one sample per voxel and channel.
    #[error(
        "{dimensions:?} voxels with {channels} channel(s) need {expected} samples, got {actual}"
    )]
    SampleCount {
        /// Voxel counts along x, y and z.
        dimensions: [usize; 3],
        /// Channels per voxel.
        channels: usize,
        /// Required number of samples.
        expected: usize,
        /// Number of samples given.
        actual: usize,
    },
}

/// A 3D grid of voxels, each with one to four channels.
///
/// Samples are stored interleaved (all channels of a voxel next to each
/// other), x fastest. They are kept as `f64` whatever the [`DataFormat`]
/// says; the format records what the data originally was and sets the
/// initial [`DataMapper`].
///
/// ```rust
/// use sightline_datamapper::{DataFormat, ScalarType, Span};
/// use sightline_processors::Volume;
///
/// let rg = DataFormat::new(ScalarType::UInt8, 2);
/// let volume = Volume::new([2, 1, 1], rg, vec![0.0, 10.0, 255.0, 20.0]).unwrap();
/// assert_eq!(volume.channels(), 2);
/// assert_eq!(volume.voxel(1), &[255.0, 20.0]);
/// assert_eq!(volume.channel(1).collect::<Vec<_>>(), [10.0, 20.0]);
/// assert_eq!(volume.data_map.data_range, Span::new(0.0, 255.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    dimensions: [usize; 3],
    format: DataFormat,
    data: Vec<f64>,
    /// How the samples relate to physical values.
    pub data_map: DataMapper,
}

impl Volume {
    /// Creates a volume; the data map is initialized from `format`.
    pub fn new(
        dimensions: [usize; 3],
        format: DataFormat,
        data: Vec<f64>,
    ) -> Result<Self, VolumeError> {
        let channels = usize::from(format.components());
        let expected = dimensions.iter().product::<usize>() * channels;
        if data.len() != expected {
            return Err(VolumeError::SampleCount {
                dimensions,
                channels,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            dimensions,
            format,
            data,
            data_map: DataMapper::from_format(format),
        })
    }

    /// Voxel counts along x, y and z.
    #[must_use]
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// The sample format.
    #[must_use]
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Channels per voxel.
    #[must_use]
    pub fn channels(&self) -> usize {
        usize::from(self.format.components())
    }

    /// Number of voxels.
    #[must_use]
    pub fn voxel_count(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// All samples, interleaved.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// All samples, interleaved.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// The channels of one voxel.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`voxel_count`](Self::voxel_count).
    #[must_use]
    pub fn voxel(&self, index: usize) -> &[f64] {
        let channels = self.channels();
        &self.data[index * channels..(index + 1) * channels]
    }

    /// Every sample of one channel, in voxel order. Empty if the volume has
    /// no such channel.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f64> + '_ {
        let channels = self.channels();
        let start = if channel < channels {
            channel
        } else {
            self.data.len()
        };
        self.data[start..].iter().step_by(channels).copied()
    }

    /// Replaces the format and resets the data map to match it. Samples are
    /// left as they are.
    pub(crate) fn set_format(&mut self, format: DataFormat) {
        self.format = format;
        self.data_map = DataMapper::from_format(format);
    }
}
