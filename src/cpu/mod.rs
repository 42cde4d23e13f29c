/*!
CPU execution engine.

Overview
- `Cpu::step_cycle` advances the engine exactly one CPU cycle. An
  instruction's timing is computed once at its boundary (base cost plus
  page-cross and branch adjustments), then counted down; all
  architectural effects commit in the final cycle.
- The cycle budget `remaining` has three regimes: negative means the
  next instruction's timing has not been computed yet, positive means
  counting down, zero means commit now. It is mutated exactly once per
  driver call.
- NMI is a level line sampled at instruction boundaries; servicing it
  pushes PC and status, sets interrupt-disable, jumps through $FFFA and
  clears the source.
- A write to $4014 latches an OAM DMA request; the engine then stalls
  for 513 cycles (514 when triggered on an odd global cycle) and the
  256-byte copy lands at the end of the stall.

Submodules
- `state`: register file, status flags, stack helpers.
- `addressing`: effective-address computation and page-cross detection.
- `table`: 256-entry opcode descriptor table.
- `exec`: instruction commit and flag updates.
*/

pub mod addressing;
pub mod exec;
pub mod state;
pub mod table;

use crate::bus::Bus;
use crate::error::CoreError;
use addressing::resolve;
use exec::{VECTOR_NMI, VECTOR_RESET, branch_taken, execute};
use state::CpuState;
use table::{Descriptor, OPCODES, is_branch};

/// Cycle-stepped 6502 core.
pub struct Cpu {
    pub(crate) state: CpuState,
    /// Cycle budget: negative = timing not computed, zero = commit,
    /// positive = counting down.
    remaining: i32,
    /// Opcode byte of the in-flight instruction; valid while
    /// `remaining >= 0`.
    current: u8,
    /// Global cycle counter since reset.
    cycles: u64,
    /// Cycles left in an OAM DMA stall; 0 = none.
    dma_stall: u32,
    /// Source page for the stalled DMA copy.
    dma_page: Option<u8>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            state: CpuState::power_up(),
            remaining: -1,
            current: 0,
            cycles: 0,
            dma_stall: 0,
            dma_page: None,
        }
    }

    /// Power-up/reset: registers to power-up values, PC from $FFFC.
    pub fn reset(&mut self, bus: &mut Bus) -> Result<(), CoreError> {
        self.state = CpuState::power_up();
        self.state.pc = bus.read_word(VECTOR_RESET)?;
        self.remaining = -1;
        self.cycles = 0;
        self.dma_stall = 0;
        self.dma_page = None;
        log::debug!("reset: pc={:#06X}", self.state.pc);
        Ok(())
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.state.a
    }
    #[inline]
    pub fn x(&self) -> u8 {
        self.state.x
    }
    #[inline]
    pub fn y(&self) -> u8 {
        self.state.y
    }
    #[inline]
    pub fn sp(&self) -> u16 {
        self.state.sp
    }
    #[inline]
    pub fn pc(&self) -> u16 {
        self.state.pc
    }
    #[inline]
    pub fn status(&self) -> state::Status {
        self.state.status
    }
    /// Cycles elapsed since reset.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
    /// True between instructions (next call will fetch/decode).
    #[inline]
    pub fn instruction_boundary(&self) -> bool {
        self.remaining < 0
    }
    /// True while an OAM DMA stall is in progress.
    #[inline]
    pub fn dma_active(&self) -> bool {
        self.dma_stall > 0
    }

    /// Advance exactly one CPU cycle.
    pub fn step_cycle(&mut self, bus: &mut Bus) -> Result<(), CoreError> {
        self.cycles += 1;

        if self.dma_stall > 0 {
            self.dma_stall -= 1;
            if self.dma_stall == 0 {
                if let Some(page) = self.dma_page.take() {
                    bus.run_oam_dma(page)?;
                    log::trace!("oam dma complete from page {page:#04X}");
                }
            }
            return Ok(());
        }

        if self.remaining < 0 {
            // instruction boundary: interrupts are serviced first
            if bus.poll_nmi() {
                self.service_nmi(bus)?;
            }
            let opcode = bus.read(self.state.pc)?;
            let Some(desc) = OPCODES[opcode as usize] else {
                log::warn!(
                    "unknown opcode {opcode:#04X} at {:#06X}, skipping",
                    self.state.pc
                );
                self.state.pc = self.state.pc.wrapping_add(1);
                return Ok(());
            };
            self.current = opcode;
            self.remaining = self.instruction_cost(bus, desc)? as i32 - 1;
            return Ok(());
        }

        self.remaining -= 1;
        if self.remaining == 0 {
            let Some(desc) = OPCODES[self.current as usize] else {
                // unreachable by construction; recover by skipping
                self.state.pc = self.state.pc.wrapping_add(1);
                self.remaining = -1;
                return Ok(());
            };
            execute(&mut self.state, bus, desc)?;
            self.remaining = -1;

            if let Some(page) = bus.take_dma_request() {
                // odd-cycle trigger pays one extra alignment cycle
                self.dma_stall = 513 + (self.cycles & 1) as u32;
                self.dma_page = Some(page);
                log::trace!(
                    "oam dma from page {page:#04X}, stall {} cycles",
                    self.dma_stall
                );
            }
        }
        Ok(())
    }

    /// Total cycle cost of the instruction about to run, including the
    /// page-cross penalty on indexed reads and branch adjustments.
    fn instruction_cost(&self, bus: &mut Bus, desc: Descriptor) -> Result<u32, CoreError> {
        let mut cost = desc.cycles;
        if is_branch(desc.op) {
            if branch_taken(&self.state, desc.op) {
                cost += 1;
                let r = resolve(&self.state, bus, desc.mode)?;
                if r.page_crossed {
                    cost += 1;
                }
            }
        } else if desc.page_penalty {
            let r = resolve(&self.state, bus, desc.mode)?;
            if r.page_crossed {
                cost += 1;
            }
        }
        Ok(cost)
    }

    /// Deliver a pending NMI at an instruction boundary.
    fn service_nmi(&mut self, bus: &mut Bus) -> Result<(), CoreError> {
        self.state.push_word(bus, self.state.pc)?;
        let b = self.state.status.to_pushed_byte(false);
        self.state.push(bus, b)?;
        self.state.status.irq_disable = true;
        self.state.pc = bus.read_word(VECTOR_NMI)?;
        log::trace!("nmi serviced, handler at {:#06X}", self.state.pc);
        Ok(())
    }
}
