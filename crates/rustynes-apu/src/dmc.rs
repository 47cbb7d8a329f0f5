//! APU DMC (Delta Modulation Channel).
//!
//! The DMC plays 1-bit delta-encoded samples read from CPU memory via DMA.
//! The timer and output shifter are modeled in full here, but the fetch
//! itself is a handshake with the bus rather than a direct memory read:
//! [`Dmc::needs_sample`] reports when a byte should be fetched from
//! [`Dmc::sample_addr`], and the caller feeds it back through
//! [`Dmc::fill_sample_buffer`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// DMC rate table for NTSC, in CPU cycles per timer tick.
const DMC_RATE_TABLE: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

/// DMC channel.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dmc {
    /// IRQ-on-completion enable.
    irq_enabled: bool,
    /// Loop-on-completion enable.
    loop_enabled: bool,
    /// Index into `DMC_RATE_TABLE`.
    rate_index: u8,

    /// Sample start register value ($4012): address = $C000 + value * 64.
    sample_address: u8,
    /// Sample length register value ($4013): length = value * 16 + 1.
    sample_length: u8,
    /// Address the next sample byte will be fetched from.
    current_address: u16,
    /// Bytes left to fetch in the current sample.
    bytes_remaining: u16,

    /// Whether the 8-bit sample buffer is empty.
    sample_buffer_empty: bool,
    /// Set when the output shifter has run dry and a fetch is needed.
    needs_sample: bool,
    /// Bits left to shift out of the sample buffer.
    bits_remaining: u8,
    /// The most recently fetched sample byte, consumed bit by bit.
    shift_register: u8,
    /// 7-bit delta-modulated output level.
    output_level: u8,

    /// Timer period, from `DMC_RATE_TABLE`.
    timer_period: u16,
    /// Timer countdown.
    timer_counter: u16,

    /// IRQ flag, set on sample completion when `irq_enabled` and not looping.
    irq_flag: bool,
    /// Channel enable state (from $4015). Gates whether new samples are
    /// fetched automatically; direct-loaded output is always audible.
    enabled: bool,
}

impl Dmc {
    /// Create a new DMC channel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            irq_enabled: false,
            loop_enabled: false,
            rate_index: 0,
            sample_address: 0,
            sample_length: 0,
            current_address: 0xC000,
            bytes_remaining: 0,
            sample_buffer_empty: true,
            needs_sample: false,
            bits_remaining: 0,
            shift_register: 0,
            output_level: 0,
            timer_period: DMC_RATE_TABLE[0],
            timer_counter: DMC_RATE_TABLE[0],
            irq_flag: false,
            enabled: false,
        }
    }

    /// Write to register $4010 (IRQ enable, loop, rate index).
    pub fn write_ctrl(&mut self, value: u8) {
        self.irq_enabled = value & 0x80 != 0;
        self.loop_enabled = value & 0x40 != 0;
        self.rate_index = value & 0x0F;
        self.timer_period = DMC_RATE_TABLE[self.rate_index as usize];

        if !self.irq_enabled {
            self.irq_flag = false;
        }
    }

    /// Write to register $4011 (direct load of the output level).
    pub fn write_direct_load(&mut self, value: u8) {
        self.output_level = value & 0x7F;
    }

    /// Write to register $4012 (sample start address).
    pub fn write_sample_address(&mut self, value: u8) {
        self.sample_address = value;
    }

    /// Write to register $4013 (sample length).
    pub fn write_sample_length(&mut self, value: u8) {
        self.sample_length = value;
    }

    /// Set the channel enable state (from a $4015 write).
    ///
    /// Enabling with no bytes left to play restarts sample playback;
    /// disabling halts it immediately and drops any pending fetch request.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;

        if enabled {
            if self.bytes_remaining == 0 {
                self.restart_sample();
            }
        } else {
            self.bytes_remaining = 0;
            self.needs_sample = false;
        }
    }

    /// Check if bytes remain in the current sample (for $4015 status read).
    #[must_use]
    pub fn active(&self) -> bool {
        self.bytes_remaining > 0
    }

    /// Clock the timer. Should be called every APU cycle.
    pub fn clock_timer(&mut self) {
        if self.timer_counter == 0 {
            self.timer_counter = self.timer_period;

            if self.bits_remaining > 0 {
                self.clock_output_shifter();
            }

            if self.sample_buffer_empty && self.bytes_remaining > 0 {
                self.needs_sample = true;
            }
        } else {
            self.timer_counter -= 1;
        }
    }

    /// Process one bit of the sample buffer into the output level.
    fn clock_output_shifter(&mut self) {
        if self.sample_buffer_empty {
            // No sample loaded: silence bit always decrements.
            if self.output_level >= 2 {
                self.output_level -= 2;
            }
        } else {
            if self.shift_register & 1 == 1 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }
            self.shift_register >>= 1;
        }

        self.bits_remaining -= 1;
        if self.bits_remaining == 0 {
            self.sample_buffer_empty = true;
        }
    }

    /// Whether the channel needs a sample byte fetched from [`Dmc::sample_addr`].
    #[must_use]
    pub fn needs_sample(&self) -> bool {
        self.needs_sample
    }

    /// The address the next sample byte should be fetched from.
    #[must_use]
    pub fn sample_addr(&self) -> u16 {
        self.current_address
    }

    /// Feed back a sample byte fetched from [`Dmc::sample_addr`].
    pub fn fill_sample_buffer(&mut self, sample: u8) {
        self.shift_register = sample;
        self.sample_buffer_empty = false;
        self.bits_remaining = 8;
        self.needs_sample = false;

        // Address wraps $FFFF -> $8000, not $0000.
        self.current_address = if self.current_address == 0xFFFF {
            0x8000
        } else {
            self.current_address + 1
        };

        self.bytes_remaining -= 1;

        if self.bytes_remaining == 0 {
            if self.loop_enabled {
                self.restart_sample();
            } else if self.irq_enabled {
                self.irq_flag = true;
            }
        }
    }

    /// Reload the current address and byte count from the sample registers.
    fn restart_sample(&mut self) {
        self.current_address = 0xC000 | (u16::from(self.sample_address) << 6);
        self.bytes_remaining = (u16::from(self.sample_length) << 4) | 1;
    }

    /// Get the current output value (0-127).
    ///
    /// Unlike the other channels this is not gated by the enable flag: a
    /// direct load to $4011 drives the DAC immediately regardless of
    /// whether the automatic sample engine is running.
    #[must_use]
    pub fn output(&self) -> u8 {
        self.output_level
    }

    /// Check if the DMC IRQ flag is set.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.irq_flag
    }

    /// Clear the DMC IRQ flag (called when $4015 is read).
    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }

    /// Bytes left to fetch in the current sample.
    #[must_use]
    pub fn bytes_remaining(&self) -> u16 {
        self.bytes_remaining
    }
}

impl Default for Dmc {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dmc_new() {
        let dmc = Dmc::new();
        assert_eq!(dmc.output(), 0);
        assert!(!dmc.active());
        assert!(dmc.sample_buffer_empty);
    }

    #[test]
    fn test_direct_load_is_audible_without_enable() {
        let mut dmc = Dmc::new();
        dmc.write_direct_load(0x7F);
        assert_eq!(dmc.output(), 127);

        // Only 7 bits are used.
        dmc.write_direct_load(0xFF);
        assert_eq!(dmc.output(), 127);
    }

    #[test]
    fn test_rate_index() {
        let mut dmc = Dmc::new();
        dmc.write_ctrl(0x0F); // rate 15, fastest
        assert_eq!(dmc.timer_period, DMC_RATE_TABLE[15]);

        dmc.write_ctrl(0x00); // rate 0, slowest
        assert_eq!(dmc.timer_period, DMC_RATE_TABLE[0]);
    }

    #[test]
    fn test_disabling_irq_clears_flag() {
        let mut dmc = Dmc::new();
        dmc.irq_flag = true;

        dmc.write_ctrl(0x00); // IRQ disabled
        assert!(!dmc.irq_pending());
    }

    #[test]
    fn test_sample_address_and_length_calculation() {
        let mut dmc = Dmc::new();

        dmc.write_sample_address(0x01);
        dmc.write_sample_length(0x01);
        dmc.set_enabled(true);

        assert_eq!(dmc.sample_addr(), 0xC040);
        assert_eq!(dmc.bytes_remaining(), 17);
    }

    #[test]
    fn test_output_shifter_increment_and_decrement() {
        let mut dmc = Dmc::new();
        dmc.output_level = 64;
        dmc.shift_register = 0xFF;
        dmc.sample_buffer_empty = false;
        dmc.bits_remaining = 8;

        dmc.clock_output_shifter();
        assert_eq!(dmc.output_level, 66);

        dmc.shift_register = 0x00;
        dmc.bits_remaining = 8;
        dmc.clock_output_shifter();
        assert_eq!(dmc.output_level, 64);
    }

    #[test]
    fn test_output_clamps_at_bounds() {
        let mut dmc = Dmc::new();
        dmc.output_level = 127;
        dmc.shift_register = 0xFF;
        dmc.sample_buffer_empty = false;
        dmc.bits_remaining = 8;
        dmc.clock_output_shifter();
        assert_eq!(dmc.output_level, 127);

        dmc.output_level = 0;
        dmc.shift_register = 0x00;
        dmc.bits_remaining = 8;
        dmc.clock_output_shifter();
        assert_eq!(dmc.output_level, 0);
    }

    #[test]
    fn test_silence_bit_when_buffer_empty() {
        let mut dmc = Dmc::new();
        dmc.output_level = 64;
        dmc.sample_buffer_empty = true;
        dmc.bits_remaining = 1;

        dmc.clock_output_shifter();
        assert_eq!(dmc.output_level, 62);
    }

    #[test]
    fn test_address_wraps_at_top_of_memory() {
        let mut dmc = Dmc::new();
        dmc.current_address = 0xFFFF;
        dmc.bytes_remaining = 2;

        dmc.fill_sample_buffer(0xAA);
        assert_eq!(dmc.current_address, 0x8000);
    }

    #[test]
    fn test_sample_completion_sets_irq() {
        let mut dmc = Dmc::new();
        dmc.write_ctrl(0x80); // IRQ enabled, no loop
        dmc.bytes_remaining = 1;

        dmc.fill_sample_buffer(0x00);
        assert_eq!(dmc.bytes_remaining, 0);
        assert!(dmc.irq_pending());
    }

    #[test]
    fn test_sample_completion_loops() {
        let mut dmc = Dmc::new();
        dmc.write_ctrl(0x40); // loop enabled, no IRQ
        dmc.write_sample_address(0x01);
        dmc.write_sample_length(0x01);
        dmc.bytes_remaining = 1;
        dmc.current_address = 0xD000;

        dmc.fill_sample_buffer(0x00);
        assert_eq!(dmc.bytes_remaining, 17);
        assert_eq!(dmc.current_address, 0xC040);
        assert!(!dmc.irq_pending());
    }

    #[test]
    fn test_enable_starts_sample_when_empty() {
        let mut dmc = Dmc::new();
        dmc.write_sample_address(0x00);
        dmc.write_sample_length(0x10);
        assert_eq!(dmc.bytes_remaining(), 0);

        dmc.set_enabled(true);
        assert_eq!(dmc.bytes_remaining(), 257);
        assert_eq!(dmc.sample_addr(), 0xC000);
    }

    #[test]
    fn test_disable_clears_bytes_remaining_and_pending_fetch() {
        let mut dmc = Dmc::new();
        dmc.set_enabled(true);
        dmc.bytes_remaining = 100;
        dmc.needs_sample = true;

        dmc.set_enabled(false);
        assert_eq!(dmc.bytes_remaining(), 0);
        assert!(!dmc.needs_sample());
    }

    #[test]
    fn test_timer_clocking_requests_sample_when_buffer_runs_dry() {
        let mut dmc = Dmc::new();
        dmc.write_ctrl(0x0F); // fastest rate
        dmc.timer_counter = 0;
        dmc.bytes_remaining = 1;
        dmc.sample_buffer_empty = true;

        dmc.clock_timer();
        assert!(dmc.needs_sample());
    }

    #[test]
    fn test_clear_irq() {
        let mut dmc = Dmc::new();
        dmc.irq_flag = true;

        dmc.clear_irq();
        assert!(!dmc.irq_pending());
    }

    #[test]
    fn test_active_tracks_bytes_remaining() {
        let mut dmc = Dmc::new();
        assert!(!dmc.active());

        dmc.bytes_remaining = 10;
        assert!(dmc.active());

        dmc.bytes_remaining = 0;
        assert!(!dmc.active());
    }
}
