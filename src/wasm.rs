//! WASM bindings for RLC Response.
//!
//! This module provides JavaScript-friendly bindings for plotting the
//! response in a web page.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmRlcSim } from 'rlc_response';
//!
//! await init();
//!
//! // L in µH, C in µF, R in Ω, V0 in V
//! const sim = new WasmRlcSim(11, 180, 0.085, 900);
//!
//! plot(sim.time(), sim.series_current());
//! plot(sim.frequency_hz(), sim.series_magnitude_db());
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::CircuitParameters;
use crate::grid::{FrequencyGrid, TimeGrid};
use crate::simulation::{simulate, SimulationConfig, SimulationGrids, SimulationReport};
use crate::{REFERENCE_FREQUENCY_START, REFERENCE_FREQUENCY_STOP, REFERENCE_TIME_SPAN};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: crate::RlcError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible RLC response calculator.
///
/// Runs the whole simulation once at construction; the getters copy the
/// resulting arrays out as `Float64Array`s.
#[wasm_bindgen]
pub struct WasmRlcSim {
    report: SimulationReport,
    frequency_hz: Vec<f64>,
}

impl WasmRlcSim {
    fn run(params: &CircuitParameters, grids: &SimulationGrids) -> Result<WasmRlcSim, JsValue> {
        let report = simulate(params, grids, &SimulationConfig::default()).map_err(to_js)?;
        let frequency_hz = report.series_bode().frequency_hz();
        Ok(WasmRlcSim {
            report,
            frequency_hz,
        })
    }
}

#[wasm_bindgen]
impl WasmRlcSim {
    /// Simulate with the reference grids.
    ///
    /// # Arguments
    /// * `inductance_uh` - Inductance in µH
    /// * `capacitance_uf` - Capacitance in µF
    /// * `resistance` - Resistance in Ω
    /// * `initial_voltage` - Initial capacitor voltage in V
    #[wasm_bindgen(constructor)]
    pub fn new(
        inductance_uh: f64,
        capacitance_uf: f64,
        resistance: f64,
        initial_voltage: f64,
    ) -> Result<WasmRlcSim, JsValue> {
        let params = CircuitParameters::from_micro_units(
            inductance_uh,
            capacitance_uf,
            resistance,
            initial_voltage,
        )
        .map_err(to_js)?;
        Self::run(&params, &SimulationGrids::reference())
    }

    /// Simulate with custom grid sizes over the reference spans.
    ///
    /// # Arguments
    /// * `time_points` - Samples over 0 to 1 ms
    /// * `frequency_points` - Log-spaced samples over 1 Hz to 1 MHz
    #[wasm_bindgen]
    pub fn with_grid(
        inductance_uh: f64,
        capacitance_uf: f64,
        resistance: f64,
        initial_voltage: f64,
        time_points: usize,
        frequency_points: usize,
    ) -> Result<WasmRlcSim, JsValue> {
        let params = CircuitParameters::from_micro_units(
            inductance_uh,
            capacitance_uf,
            resistance,
            initial_voltage,
        )
        .map_err(to_js)?;
        let grids = SimulationGrids::new(
            TimeGrid::linspace(0.0, REFERENCE_TIME_SPAN, time_points).map_err(to_js)?,
            FrequencyGrid::logspace(
                REFERENCE_FREQUENCY_START,
                REFERENCE_FREQUENCY_STOP,
                frequency_points,
            )
            .map_err(to_js)?,
        );
        Self::run(&params, &grids)
    }

    /// Sample times in seconds.
    #[wasm_bindgen]
    pub fn time(&self) -> Vec<f64> {
        self.report.time().to_vec()
    }

    #[wasm_bindgen]
    pub fn series_current(&self) -> Vec<f64> {
        self.report.series_current().to_vec()
    }

    #[wasm_bindgen]
    pub fn parallel_current(&self) -> Vec<f64> {
        self.report.parallel_current().to_vec()
    }

    #[wasm_bindgen]
    pub fn series_voltage(&self) -> Vec<f64> {
        self.report.series_voltage().to_vec()
    }

    #[wasm_bindgen]
    pub fn parallel_voltage(&self) -> Vec<f64> {
        self.report.parallel_voltage().to_vec()
    }

    /// Sweep frequencies in Hz.
    #[wasm_bindgen]
    pub fn frequency_hz(&self) -> Vec<f64> {
        self.frequency_hz.clone()
    }

    #[wasm_bindgen]
    pub fn series_magnitude_db(&self) -> Vec<f64> {
        self.report.series_bode().magnitude_db.clone()
    }

    #[wasm_bindgen]
    pub fn series_phase_deg(&self) -> Vec<f64> {
        self.report.series_bode().phase_deg.clone()
    }

    #[wasm_bindgen]
    pub fn parallel_magnitude_db(&self) -> Vec<f64> {
        self.report.parallel_bode().magnitude_db.clone()
    }

    #[wasm_bindgen]
    pub fn parallel_phase_deg(&self) -> Vec<f64> {
        self.report.parallel_bode().phase_deg.clone()
    }

    /// Natural frequency in Hz.
    #[wasm_bindgen(getter)]
    pub fn natural_frequency_hz(&self) -> f64 {
        self.report.parameters.natural_frequency_hz()
    }

    /// Human-readable run summary.
    #[wasm_bindgen]
    pub fn summary(&self) -> String {
        self.report.summary().to_string()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
