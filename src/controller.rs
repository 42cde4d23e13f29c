/*!
Standard controller: strobe latch plus an 8-bit shift register.

While the strobe is high the button states are latched continuously and
reads return the A button. Once the strobe drops, each read shifts out
one button in hardware order (A, B, Select, Start, Up, Down, Left,
Right), wrapping back to A after the eighth read.
*/

/// Button bit positions in read-out order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

#[derive(Debug, Default)]
pub struct Controller {
    /// Live button states, one bit per `Button`.
    buttons: u8,
    /// Snapshot taken while the strobe is high.
    latched: u8,
    strobe: bool,
    index: u8,
}

impl Controller {
    pub fn new() -> Self {
        Controller::default()
    }

    /// Update the live state of one button.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let bit = 1u8 << (button as u8);
        if pressed {
            self.buttons |= bit;
        } else {
            self.buttons &= !bit;
        }
    }

    /// Replace the whole live state, one bit per `Button`.
    pub fn set_buttons(&mut self, mask: u8) {
        self.buttons = mask;
    }

    /// CPU write to $4016.
    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = value & 1 != 0;
        if self.strobe {
            self.latched = self.buttons;
            self.index = 0;
        }
    }

    /// CPU read from $4016: bit 0 carries the button state.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            self.latched = self.buttons;
            return self.latched & 1;
        }
        let bit = (self.latched >> self.index) & 1;
        self.index = (self.index + 1) % 8;
        bit
    }
}
