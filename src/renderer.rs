//! Audio rendering pipeline interface
//!
//! Sample clocking, buffering and DAC/I2S output belong to the platform. The
//! sink only initializes the renderer once and starts/stops it as the media
//! stream state changes.

use crate::{constants::DEFAULT_SAMPLE_RATE, stack::DriverError};

/// Where rendered samples are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    /// External I2S DAC
    #[default]
    I2s,
    /// Merus Audio class-D amplifier over I2S
    I2sMerus,
    /// On-chip DAC
    DacBuiltIn,
}

/// I2S sample width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitDepth {
    /// 16 bits per sample
    #[default]
    Bits16,
    /// 32 bits per sample
    Bits32,
}

impl BitDepth {
    /// Bits per sample
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits16 => 16,
            Self::Bits32 => 32,
        }
    }
}

/// I2S peripheral index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2sPort {
    /// I2S peripheral 0
    #[default]
    I2s0,
    /// I2S peripheral 1
    I2s1,
}

/// Renderer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RendererConfig {
    /// Sample width, derived from the output mode
    pub bit_depth: BitDepth,
    /// I2S peripheral used for output
    pub i2s_port: I2sPort,
    /// Nominal sample rate in Hz
    pub sample_rate: u32,
    /// Clock correction factor applied to `sample_rate`
    pub sample_rate_modifier: f32,
    /// Output routing
    pub output_mode: OutputMode,
}

impl RendererConfig {
    /// Default configuration for `output_mode`
    ///
    /// Merus amplifiers take 32-bit samples, every other output 16-bit.
    #[must_use]
    pub fn for_output(output_mode: OutputMode) -> Self {
        Self {
            bit_depth: Self::bit_depth_for(output_mode),
            i2s_port: I2sPort::I2s0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            sample_rate_modifier: 1.0,
            output_mode,
        }
    }

    /// Sample width required by `output_mode`
    #[must_use]
    pub const fn bit_depth_for(output_mode: OutputMode) -> BitDepth {
        match output_mode {
            OutputMode::I2sMerus => BitDepth::Bits32,
            OutputMode::I2s | OutputMode::DacBuiltIn => BitDepth::Bits16,
        }
    }

    /// Sample rate after applying the modifier, rounded to the nearest Hz
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn effective_sample_rate(&self) -> u32 {
        (self.sample_rate as f32 * self.sample_rate_modifier + 0.5) as u32
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::for_output(OutputMode::default())
    }
}

/// Audio output pipeline
pub trait AudioRenderer {
    /// One-time pipeline setup
    ///
    /// # Errors
    /// Returns the driver status if the pipeline cannot be configured
    fn init(&mut self, config: &RendererConfig) -> Result<(), DriverError>;

    /// Begin consuming stream data
    ///
    /// # Errors
    /// Returns the driver status if output cannot start
    fn start(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Stop output and flush buffered samples
    ///
    /// # Errors
    /// Returns the driver status if output cannot stop
    fn stop(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}
