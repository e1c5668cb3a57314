use anyhow::Error;

use crate::problem::tables::{CapacityRateTable, DemandTable, OperatingCalendar};

/// Supplies the three planning tables an allocation run starts from:
/// capacity rates, the operating-day calendar and default demand.
///
/// Implementations own storage and format; the engine only ever sees typed
/// tables. A provider is injected per run, so hosts can back it with files
/// or services and tests can substitute fixtures.
pub trait BaselineProvider {
    fn capacity_rates(&self) -> Result<CapacityRateTable, Error>;

    fn calendar(&self) -> Result<OperatingCalendar, Error>;

    fn default_demand(&self) -> Result<DemandTable, Error>;
}

/// Baseline tables held directly in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBaseline {
    pub rates: CapacityRateTable,
    pub calendar: OperatingCalendar,
    pub demand: DemandTable,
}

impl BaselineProvider for InMemoryBaseline {
    fn capacity_rates(&self) -> Result<CapacityRateTable, Error> {
        Ok(self.rates.clone())
    }

    fn calendar(&self) -> Result<OperatingCalendar, Error> {
        Ok(self.calendar.clone())
    }

    fn default_demand(&self) -> Result<DemandTable, Error> {
        Ok(self.demand.clone())
    }
}
