//! Session controller
//!
//! Runs one encode or decode session over an open line. The receive
//! handler fills the ring buffer independently; the controller only ever
//! looks at the buffer and the error state between bytes, which is also
//! where a stop request takes effect.

use heapless::Deque;
use keytone_core::{ErrorKind, ErrorState, RingBuffer, SessionEvent, SessionState};
use keytone_drivers::{SerialLine, TxError, TxTiming};
use keytone_hal::SerialHardware;
use keytone_protocol::{decode_reply, Symbol};

use crate::error::{SessionError, EXIT_ERROR, EXIT_OK};

/// Echo bytes kept between calls to [`SessionController::take_echo`]
pub const ECHO_CAPACITY: usize = 256;

/// Sequences a single session
///
/// The controller borrows the line, the receive buffer and the error
/// state; the platform's interrupt glue holds a
/// [`Receiver`](keytone_drivers::Receiver) on the same three.
pub struct SessionController<'a, H: SerialHardware, const N: usize> {
    line: &'a SerialLine<H>,
    buffer: &'a RingBuffer<N>,
    errors: &'a ErrorState,
    timing: TxTiming,
    state: SessionState,
    stop_requested: bool,
    echo: Deque<u8, ECHO_CAPACITY>,
}

impl<'a, H: SerialHardware, const N: usize> SessionController<'a, H, N> {
    pub fn new(line: &'a SerialLine<H>, buffer: &'a RingBuffer<N>, errors: &'a ErrorState) -> Self {
        Self {
            line,
            buffer,
            errors,
            timing: TxTiming::default(),
            state: SessionState::Idle,
            stop_requested: false,
            echo: Deque::new(),
        }
    }

    /// Use custom transmit time budgets
    pub fn with_timing(mut self, timing: TxTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start sending keys
    pub fn start_encoding(&mut self) -> Result<(), SessionError> {
        self.start(SessionEvent::StartEncoding)
    }

    /// Start reading decoded tones
    pub fn start_decoding(&mut self) -> Result<(), SessionError> {
        self.start(SessionEvent::StartDecoding)
    }

    fn start(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::WrongState(self.state));
        }
        self.errors.clear();
        self.buffer.clear();
        self.stop_requested = false;
        self.apply(event);
        Ok(())
    }

    fn apply(&mut self, event: SessionEvent) {
        let next = self.state.transition(event);
        if next != self.state {
            info!("session {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Ask the session to stop before the next byte
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// End the session now
    pub fn stop(&mut self) {
        self.apply(SessionEvent::Stop);
    }

    /// Move to `Terminated` if a fault or stop is pending
    ///
    /// Returns the fault, if that is what ended the session.
    fn check_between_bytes(&mut self) -> Result<(), SessionError> {
        if let Some(kind) = self.errors.current() {
            if self.state.is_active() {
                self.apply(SessionEvent::Fault(kind));
                return Err(SessionError::Fault(kind));
            }
        }
        if self.stop_requested {
            self.stop_requested = false;
            self.stop();
        }
        Ok(())
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::WrongState(self.state))
        }
    }

    /// Move bytes the board sent back during encoding to the echo log
    ///
    /// The log keeps the newest `ECHO_CAPACITY` bytes.
    fn collect_echo(&mut self) {
        let mut dropped = 0usize;
        while let Some(byte) = self.buffer.pop() {
            if self.echo.is_full() {
                self.echo.pop_front();
                dropped += 1;
            }
            let _ = self.echo.push_back(byte);
        }
        if dropped > 0 {
            warn!("echo log full, dropped {} oldest bytes", dropped);
        }
    }

    /// Encode and send one key
    ///
    /// Letters are accepted in either case. Returns the code written. An
    /// unknown key is reported and skipped; a handshake timeout ends the
    /// session.
    pub fn send_key(&mut self, key: char) -> Result<u8, SessionError> {
        self.check_between_bytes()?;
        self.expect_state(SessionState::Encoding)?;

        let code = Symbol::from_key(key)?.code();
        let result = self.line.transmitter(self.timing).send(code);
        self.collect_echo();

        match result {
            Ok(()) => Ok(code),
            Err(TxError::HandshakeTimeout { .. }) => {
                self.errors.raise(ErrorKind::HandshakeTimeout);
                // An overflow raised first wins
                let kind = self.errors.current().unwrap_or(ErrorKind::HandshakeTimeout);
                self.apply(SessionEvent::Fault(kind));
                Err(SessionError::Fault(kind))
            }
            Err(TxError::LineClosed) => {
                warn!("line closed during encoding");
                self.stop();
                Err(SessionError::LineClosed)
            }
        }
    }

    /// Send a string of keys, one result per key
    ///
    /// The iterator ends early when the session terminates.
    pub fn dial<'c>(&'c mut self, keys: &'c str) -> Dial<'c, 'a, H, N> {
        Dial {
            controller: self,
            keys: keys.chars(),
        }
    }

    /// Bytes the board sent while encoding, since the last call
    pub fn take_echo(&mut self) -> heapless::Vec<u8, ECHO_CAPACITY> {
        if self.state == SessionState::Encoding {
            self.collect_echo();
        }
        let echo = self.echo.iter().copied().collect();
        self.echo.clear();
        echo
    }

    /// Decode the next buffered reply byte, if any
    ///
    /// `Ok(None)` means nothing is waiting. An unknown reply byte is
    /// reported and dropped; a buffer overflow ends the session.
    pub fn poll_symbol(&mut self) -> Result<Option<Symbol>, SessionError> {
        self.check_between_bytes()?;
        self.expect_state(SessionState::Decoding)?;

        let Some(byte) = self.buffer.pop() else {
            return Ok(None);
        };
        match decode_reply(byte) {
            Ok(symbol) => {
                debug!("reply {} -> {}", byte, symbol.as_char());
                Ok(Some(symbol))
            }
            Err(e) => {
                warn!("unknown reply byte {}", byte);
                Err(e.into())
            }
        }
    }

    /// Decode everything buffered so far
    ///
    /// The iterator ends when the buffer is empty or the session
    /// terminates; call again later for more.
    pub fn drain(&mut self) -> Drain<'_, 'a, H, N> {
        Drain { controller: self }
    }

    /// Fault that ended the session, if any
    pub fn terminal_error(&self) -> Option<SessionError> {
        self.state.fault().map(SessionError::Fault)
    }

    /// Process exit status: 0 unless the session ended in a fault
    pub fn exit_code(&self) -> i32 {
        match self.terminal_error() {
            Some(_) => EXIT_ERROR,
            None => EXIT_OK,
        }
    }
}

/// Iterator returned by [`SessionController::dial`]
pub struct Dial<'c, 'a, H: SerialHardware, const N: usize> {
    controller: &'c mut SessionController<'a, H, N>,
    keys: core::str::Chars<'c>,
}

impl<H: SerialHardware, const N: usize> Iterator for Dial<'_, '_, H, N> {
    type Item = Result<u8, SessionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.controller.check_between_bytes() {
            return Some(Err(e));
        }
        if self.controller.state != SessionState::Encoding {
            return None;
        }
        let key = self.keys.next()?;
        Some(self.controller.send_key(key))
    }
}

/// Iterator returned by [`SessionController::drain`]
pub struct Drain<'c, 'a, H: SerialHardware, const N: usize> {
    controller: &'c mut SessionController<'a, H, N>,
}

impl<H: SerialHardware, const N: usize> Iterator for Drain<'_, '_, H, N> {
    type Item = Result<Symbol, SessionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.controller.check_between_bytes() {
            return Some(Err(e));
        }
        if self.controller.state != SessionState::Decoding {
            return None;
        }
        self.controller.poll_symbol().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_time::Duration;
    use keytone_core::Termination;
    use keytone_drivers::sim::SimulatedUart;
    use keytone_hal::LineConfig;
    use keytone_protocol::CodecError;

    fn fast() -> TxTiming {
        TxTiming {
            cts_timeout: Duration::from_millis(5),
            thre_timeout: Duration::from_millis(5),
            pacing: Duration::from_ticks(0),
        }
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors);

        assert_eq!(session.state(), SessionState::Idle);
        session.start_decoding().unwrap();
        assert_eq!(
            session.start_encoding(),
            Err(SessionError::WrongState(SessionState::Decoding))
        );
        session.stop();
        assert_eq!(
            session.start_decoding(),
            Err(SessionError::WrongState(SessionState::Terminated(
                Termination::Stopped
            )))
        );
    }

    #[test]
    fn test_start_clears_stale_state() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        buffer.push(0x99).unwrap();
        errors.raise(ErrorKind::BufferOverflow);

        let mut session = SessionController::new(&line, &buffer, &errors);
        session.start_decoding().unwrap();
        assert!(buffer.is_empty());
        assert_eq!(errors.current(), None);
        assert_eq!(session.poll_symbol(), Ok(None));
    }

    #[test]
    fn test_send_key_writes_code() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        {
            let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
            let mut session = SessionController::new(&line, &buffer, &errors).with_timing(fast());
            session.start_encoding().unwrap();
            assert_eq!(session.send_key('5'), Ok(0x05));
            assert_eq!(session.send_key('d'), Ok(0x0D));
            assert_eq!(session.send_key('*'), Ok(0x0E));
        }
        assert_eq!(sim.sent(), &[0x05, 0x0D, 0x0E]);
    }

    #[test]
    fn test_unknown_key_does_not_end_session() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors).with_timing(fast());
        session.start_encoding().unwrap();

        assert_eq!(
            session.send_key('x'),
            Err(SessionError::Codec(CodecError::UnknownSymbol('x')))
        );
        assert_eq!(session.state(), SessionState::Encoding);
        assert_eq!(session.send_key('1'), Ok(0x01));
    }

    #[test]
    fn test_handshake_timeout_terminates() {
        let mut sim = SimulatedUart::new();
        sim.set_cts(false);
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors).with_timing(fast());
        session.start_encoding().unwrap();

        assert_eq!(
            session.send_key('1'),
            Err(SessionError::Fault(ErrorKind::HandshakeTimeout))
        );
        assert_eq!(
            session.state(),
            SessionState::Terminated(Termination::Fault(ErrorKind::HandshakeTimeout))
        );
        assert_eq!(
            session.terminal_error(),
            Some(SessionError::Fault(ErrorKind::HandshakeTimeout))
        );
        assert_eq!(session.exit_code(), 99);
        // Terminated is final
        assert!(matches!(
            session.send_key('2'),
            Err(SessionError::WrongState(SessionState::Terminated(_)))
        ));
    }

    #[test]
    fn test_dial_stops_at_terminal_error() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors).with_timing(fast());
        session.start_encoding().unwrap();

        let results: Vec<_> = session.dial("12?3").collect();
        assert_eq!(
            results,
            vec![
                Ok(0x01),
                Ok(0x02),
                Err(SessionError::Codec(CodecError::UnknownSymbol('?'))),
                Ok(0x03),
            ]
        );

        line.registers().with(|hw, _| hw.set_cts(false));
        let results: Vec<_> = session.dial("456").collect();
        assert_eq!(
            results,
            vec![Err(SessionError::Fault(ErrorKind::HandshakeTimeout))]
        );
    }

    #[test]
    fn test_stop_request_takes_effect_between_bytes() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors).with_timing(fast());
        session.start_encoding().unwrap();
        session.send_key('1').unwrap();

        session.request_stop();
        assert_eq!(session.state(), SessionState::Encoding);
        assert_eq!(session.dial("23").count(), 0);
        assert_eq!(
            session.state(),
            SessionState::Terminated(Termination::Stopped)
        );
        assert_eq!(session.exit_code(), 0);
        assert_eq!(session.terminal_error(), None);
    }

    #[test]
    fn test_echo_collected_while_encoding() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let rx = line.receiver(&buffer, &errors);
        let mut session = SessionController::new(&line, &buffer, &errors).with_timing(fast());
        session.start_encoding().unwrap();

        line.registers().with(|hw, _| hw.inject(0x21));
        rx.on_byte_available();
        session.send_key('8').unwrap();
        line.registers().with(|hw, _| hw.inject(0x22));
        rx.on_byte_available();

        assert_eq!(session.take_echo().as_slice(), &[0x21, 0x22]);
        assert!(session.take_echo().is_empty());
    }

    #[test]
    fn test_echo_log_keeps_newest_bytes() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<512>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors).with_timing(fast());
        session.start_encoding().unwrap();

        let extra = 10;
        for i in 0..ECHO_CAPACITY + extra {
            buffer.push(i as u8).unwrap();
        }
        session.send_key('1').unwrap();
        buffer.push(0xEE).unwrap();

        let echo = session.take_echo();
        assert_eq!(echo.len(), ECHO_CAPACITY);
        assert_eq!(echo[0], (extra + 1) as u8);
        assert_eq!(echo[ECHO_CAPACITY - 2], (ECHO_CAPACITY + extra - 1) as u8);
        assert_eq!(echo[ECHO_CAPACITY - 1], 0xEE);
        assert_eq!(session.state(), SessionState::Encoding);
    }

    #[test]
    fn test_overflow_terminates_encoding() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<4>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let rx = line.receiver(&buffer, &errors);
        let mut session = SessionController::new(&line, &buffer, &errors).with_timing(fast());
        session.start_encoding().unwrap();

        for byte in [0x01, 0x02, 0x03, 0x10] {
            line.registers().with(|hw, _| hw.inject(byte));
            rx.on_byte_available();
        }
        assert_eq!(
            session.send_key('1'),
            Err(SessionError::Fault(ErrorKind::BufferOverflow))
        );
        assert_eq!(
            session.state(),
            SessionState::Terminated(Termination::Fault(ErrorKind::BufferOverflow))
        );
        assert!(line.registers().with(|hw, _| hw.sent().is_empty()));
        assert_eq!(session.exit_code(), 99);
    }

    #[test]
    fn test_overflow_during_send_wins_over_timeout() {
        let mut sim = SimulatedUart::new();
        sim.set_cts(false);
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors).with_timing(TxTiming {
            cts_timeout: Duration::from_millis(300),
            ..fast()
        });
        session.start_encoding().unwrap();

        let result = std::thread::scope(|s| {
            let errors = &errors;
            s.spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(20));
                errors.raise(ErrorKind::BufferOverflow);
            });
            session.send_key('1')
        });
        assert_eq!(result, Err(SessionError::Fault(ErrorKind::BufferOverflow)));
        assert_eq!(errors.current(), Some(ErrorKind::BufferOverflow));
        assert_eq!(
            session.state(),
            SessionState::Terminated(Termination::Fault(ErrorKind::BufferOverflow))
        );
    }

    #[test]
    fn test_stop_request_ends_drain() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors);
        session.start_decoding().unwrap();

        buffer.push(0x11).unwrap();
        session.request_stop();
        assert_eq!(session.drain().count(), 0);
        assert_eq!(
            session.state(),
            SessionState::Terminated(Termination::Stopped)
        );
        assert_eq!(session.exit_code(), 0);
    }

    #[test]
    fn test_drain_decodes_replies() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors);
        session.start_decoding().unwrap();

        for byte in [0x55, 0x44, 0x02] {
            buffer.push(byte).unwrap();
        }
        let symbols: Vec<_> = session.drain().collect();
        assert_eq!(
            symbols,
            vec![
                Ok(Symbol::Zero),
                Err(SessionError::Codec(CodecError::UnknownCode(0x44))),
                Ok(Symbol::Three),
            ]
        );
        assert_eq!(session.drain().count(), 0);
        assert_eq!(session.state(), SessionState::Decoding);
    }

    #[test]
    fn test_overflow_terminates_decoding() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<4>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let rx = line.receiver(&buffer, &errors);
        let mut session = SessionController::new(&line, &buffer, &errors);
        session.start_decoding().unwrap();

        for byte in [0x01, 0x02, 0x03, 0x10] {
            line.registers().with(|hw, _| hw.inject(byte));
            rx.on_byte_available();
        }
        let symbols: Vec<_> = session.drain().collect();
        assert_eq!(
            symbols,
            vec![Err(SessionError::Fault(ErrorKind::BufferOverflow))]
        );
        assert_eq!(session.exit_code(), 99);
        assert_eq!(session.drain().count(), 0);
    }

    #[test]
    fn test_wrong_session_kind() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let mut session = SessionController::new(&line, &buffer, &errors);

        assert_eq!(
            session.poll_symbol(),
            Err(SessionError::WrongState(SessionState::Idle))
        );
        session.start_decoding().unwrap();
        assert_eq!(
            session.send_key('1'),
            Err(SessionError::WrongState(SessionState::Decoding))
        );
    }
}
