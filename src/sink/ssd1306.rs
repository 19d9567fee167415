//! SSD1306 OLED driver
//!
//! Drives 128x32 and 128x64 SSD1306 panels over any blocking
//! `embedded-hal` I2C bus. The whole canvas is sent every frame using
//! horizontal addressing mode, one I2C write per 8-pixel page.

use super::PixelSink;
use crate::buffer::Canvas;
use crate::config::DisplayConfig;
use embedded_hal::i2c::{Error as _, I2c};
use tracing::debug;

use crate::error::DeviceError;

/// Control byte prefixing a command stream.
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte prefixing display RAM data.
const CONTROL_DATA: u8 = 0x40;

/// Largest column count the controller addresses.
const MAX_WIDTH: u32 = 128;

/// SSD1306 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const DISPLAY_RESUME: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// SSD1306 OLED driver
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    width: u32,
    height: u32,
}

impl<I2C: I2c> Ssd1306<I2C> {
    /// Create a driver for a panel of the given size.
    ///
    /// Nothing is sent to the bus until [`init`](Self::init).
    pub fn new(i2c: I2C, address: u8, width: u32, height: u32) -> Result<Self, DeviceError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(DeviceError::Unsupported(format!(
                "width {width} (SSD1306 supports 1..={MAX_WIDTH})"
            )));
        }
        if !matches!(height, 16 | 32 | 64) {
            return Err(DeviceError::Unsupported(format!(
                "height {height} (SSD1306 supports 16, 32 or 64)"
            )));
        }
        Ok(Self {
            i2c,
            address,
            width,
            height,
        })
    }

    /// Open and initialize a panel as described by `config`.
    ///
    /// Suitable as the device probe for [`RowDisplay::open`](crate::RowDisplay::open).
    pub fn probe(i2c: I2C, config: &DisplayConfig) -> Result<Self, DeviceError> {
        let mut display = Self::new(i2c, config.i2c_address, config.width, config.height)?;
        display.init()?;
        debug!(address = config.i2c_address, "SSD1306 initialized");
        Ok(display)
    }

    /// Send the power-on command sequence.
    pub fn init(&mut self) -> Result<(), DeviceError> {
        let tall = self.height == 64;
        // The height was validated in `new`, so it fits.
        let mux = u8::try_from(self.height - 1).unwrap_or(0x3F);
        let init_cmds: &[&[u8]] = &[
            &[cmd::DISPLAY_OFF],
            &[cmd::SET_CLOCK_DIV, 0x80],
            &[cmd::SET_MUX_RATIO, mux],
            &[cmd::SET_DISPLAY_OFFSET, 0x00],
            &[cmd::SET_START_LINE],
            &[cmd::SET_CHARGE_PUMP, 0x14],
            &[cmd::SET_MEMORY_MODE, 0x00], // Horizontal addressing
            &[cmd::SET_SEG_REMAP],
            &[cmd::SET_COM_SCAN_DEC],
            &[cmd::SET_COM_PINS, if tall { 0x12 } else { 0x02 }],
            &[cmd::SET_CONTRAST, if tall { 0xCF } else { 0x8F }],
            &[cmd::SET_PRECHARGE, 0xF1],
            &[cmd::SET_VCOM_DETECT, 0x40],
            &[cmd::DISPLAY_RESUME],
            &[cmd::SET_NORMAL],
            &[cmd::DISPLAY_ON],
        ];

        for command in init_cmds {
            self.command(command)?;
        }
        Ok(())
    }

    /// Send one command with its arguments.
    fn command(&mut self, bytes: &[u8]) -> Result<(), DeviceError> {
        let mut buf = [0u8; 4];
        buf[0] = CONTROL_COMMAND;
        buf[1..=bytes.len()].copy_from_slice(bytes);
        self.write(&buf[..=bytes.len()])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DeviceError> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|e| DeviceError::Bus(format!("{:?}", e.kind())))
    }

    /// Number of 8-pixel pages.
    const fn pages(&self) -> u32 {
        self.height / 8
    }
}

impl<I2C> PixelSink for Ssd1306<I2C>
where
    I2C: I2c + Send,
{
    fn present_frame(&mut self, canvas: &Canvas) -> Result<(), DeviceError> {
        if canvas.width() != self.width || canvas.height() != self.height {
            return Err(DeviceError::Unsupported(format!(
                "canvas {}x{} does not match panel {}x{}",
                canvas.width(),
                canvas.height(),
                self.width,
                self.height
            )));
        }

        // Both bounds fit in a byte after validation in `new`.
        let last_column = u8::try_from(self.width - 1).unwrap_or(0x7F);
        let last_page = u8::try_from(self.pages() - 1).unwrap_or(0x07);
        self.command(&[cmd::SET_COLUMN_ADDR, 0, last_column])?;
        self.command(&[cmd::SET_PAGE_ADDR, 0, last_page])?;

        let width = self.width as usize;
        let mut data = Vec::with_capacity(width + 1);
        for page in canvas.to_pages().chunks(width) {
            data.clear();
            data.push(CONTROL_DATA);
            data.extend_from_slice(page);
            self.write(&data)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ssd1306"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Bus that records every write.
    #[derive(Default)]
    struct MockBus {
        writes: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    impl ErrorType for MockBus {
        type Error = ErrorKind;
    }

    impl I2c for MockBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_rejects_unsupported_geometry() {
        assert!(Ssd1306::new(MockBus::default(), 0x3C, 256, 32).is_err());
        assert!(Ssd1306::new(MockBus::default(), 0x3C, 128, 48).is_err());
        assert!(Ssd1306::new(MockBus::default(), 0x3C, 128, 32).is_ok());
    }

    #[test]
    fn test_init_sequence() {
        let config = DisplayConfig::default();
        let display = Ssd1306::probe(MockBus::default(), &config).unwrap();
        let writes = &display.i2c.writes;

        assert!(writes.iter().all(|(addr, bytes)| *addr == 0x3C && bytes[0] == 0x00));
        assert_eq!(writes.first().unwrap().1, vec![0x00, cmd::DISPLAY_OFF]);
        assert_eq!(writes.last().unwrap().1, vec![0x00, cmd::DISPLAY_ON]);
        assert!(writes.contains(&(0x3C, vec![0x00, cmd::SET_MUX_RATIO, 31])));
        assert!(writes.contains(&(0x3C, vec![0x00, cmd::SET_COM_PINS, 0x02])));
    }

    #[test]
    fn test_probe_fails_on_dead_bus() {
        let bus = MockBus {
            fail: true,
            ..MockBus::default()
        };
        let err = Ssd1306::probe(bus, &DisplayConfig::default()).err().unwrap();
        assert!(matches!(err, DeviceError::Bus(_)));
    }

    #[test]
    fn test_present_frame_streams_pages() {
        let mut display = Ssd1306::new(MockBus::default(), 0x3D, 128, 32).unwrap();
        let mut canvas = Canvas::new(128, 32);
        canvas.set(0, 0, true);
        canvas.set(127, 31, true);

        display.present_frame(&canvas).unwrap();
        let writes = &display.i2c.writes;

        assert_eq!(writes.len(), 2 + 4);
        assert_eq!(writes[0].1, vec![0x00, cmd::SET_COLUMN_ADDR, 0, 127]);
        assert_eq!(writes[1].1, vec![0x00, cmd::SET_PAGE_ADDR, 0, 3]);
        for (_, page) in &writes[2..] {
            assert_eq!(page.len(), 129);
            assert_eq!(page[0], CONTROL_DATA);
        }
        assert_eq!(writes[2].1[1], 0x01);
        assert_eq!(writes[5].1[128], 0x80);
        assert!(writes.iter().all(|(addr, _)| *addr == 0x3D));
    }

    #[test]
    fn test_present_frame_rejects_mismatched_canvas() {
        let mut display = Ssd1306::new(MockBus::default(), 0x3C, 128, 64).unwrap();
        let result = display.present_frame(&Canvas::new(128, 32));
        assert!(matches!(result, Err(DeviceError::Unsupported(_))));
        assert!(display.i2c.writes.is_empty());
    }
}
