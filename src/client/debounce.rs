use std::time::Duration;
use tokio::time::Instant;

/// Temporizador cancelable: sólo sobrevive el último valor programado.
///
/// No duerme por sí mismo; quien lo usa consulta `deadline` y llama a `fire`
/// con su reloj.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Programa el valor, reiniciando la ventana
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Entrega el valor si la ventana ya venció
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((deadline, value)) if now >= deadline => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_last_value_survives() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.schedule("T", start);
        debouncer.schedule("To", start + Duration::from_millis(100));
        debouncer.schedule("Toy", start + Duration::from_millis(200));

        assert_eq!(debouncer.fire(start + Duration::from_millis(600)), None);
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(700)));
        assert_eq!(debouncer.fire(start + Duration::from_millis(700)), Some("Toy"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.fire(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule(1, start);
        debouncer.cancel();
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.fire(start + Duration::from_secs(1)), None);
    }
}
