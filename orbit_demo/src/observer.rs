//! Application that periodically logs statistics for one body

use origin_engine::prelude::*;

/// Logs a [`BodyReport`] for `subject` every `report_every` ticks
pub struct ReportingObserver {
    subject: String,
    reference: Option<String>,
    report_every: u64,
    subject_entity: Option<Entity>,
    reference_entity: Option<Entity>,
    reports: usize,
    proxies: ProxyTotals,
}

/// Proxy churn accumulated over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyTotals {
    /// Proxies created
    pub created: usize,
    /// Proxies destroyed
    pub destroyed: usize,
}

impl ReportingObserver {
    /// Observe `subject`, reporting every `report_every` ticks (at least 1)
    pub fn new(subject: impl Into<String>, report_every: u64) -> Self {
        Self {
            subject: subject.into(),
            reference: None,
            report_every: report_every.max(1),
            subject_entity: None,
            reference_entity: None,
            reports: 0,
            proxies: ProxyTotals::default(),
        }
    }

    /// Also report motion relative to `reference`
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Reports logged so far
    pub fn reports(&self) -> usize {
        self.reports
    }

    /// Proxy churn seen so far
    pub fn proxy_totals(&self) -> ProxyTotals {
        self.proxies
    }

    fn resolve(engine: &Engine, name: &str) -> Result<Entity, AppError> {
        engine
            .scene()
            .find(name)
            .ok_or_else(|| AppError::Custom(format!("No body named '{name}' in the scene")))
    }

    fn report(&mut self, engine: &Engine) -> Result<(), AppError> {
        let Some(subject) = self.subject_entity else {
            return Ok(());
        };
        let report = engine.scene().body_report(subject, self.reference_entity)?;
        log::info!(
            "t = {:.0} s ({} ticks)\n{report}",
            engine.scene().sim_time(),
            engine.scene().tick_count()
        );
        self.reports += 1;
        Ok(())
    }
}

impl Application for ReportingObserver {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        self.subject_entity = Some(Self::resolve(engine, &self.subject)?);
        self.reference_entity = match &self.reference {
            Some(name) => Some(Self::resolve(engine, name)?),
            None => None,
        };
        log::info!(
            "Observing '{}' every {} ticks at time scale {}",
            self.subject,
            self.report_every,
            engine.scene().origin().time_scale()
        );
        Ok(())
    }

    fn update(&mut self, _engine: &mut Engine, _delta_time: f64) -> Result<(), AppError> {
        Ok(())
    }

    fn on_tick(&mut self, engine: &mut Engine, tick: &SceneTick) -> Result<(), AppError> {
        self.proxies.created += tick.proxies.created;
        self.proxies.destroyed += tick.proxies.destroyed;

        if engine.scene().tick_count() % self.report_every == 0 {
            self.report(engine)?;
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let backend = engine.scene().backend();
        log::info!(
            "Run finished: {} reports, {} proxies created, {} destroyed, {} live",
            self.reports,
            self.proxies.created,
            self.proxies.destroyed,
            backend.live_count()
        );
        for level in 0..engine.scene().origin().level_count() {
            let name = engine.scene().origin().ladder().name(level).unwrap_or("?");
            log::info!(
                "  level {level} ({name}): {} proxies, {} instance bytes",
                backend.proxies_on_level(level).count(),
                backend.instance_bytes(level).len()
            );
        }
    }
}
