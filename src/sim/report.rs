//! Simulation results

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::risk::RiskMetrics;

/// Outcome of one simulated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub instrument: String,
    pub ticks: u64,
    pub entries: u32,
    pub trades: u32,
    pub wins: u32,
    pub losses: u32,
    /// Percent of closed trades that made money
    pub win_rate: Decimal,
    pub realized_pnl: Decimal,
    pub initial_balance: Decimal,
    pub final_balance: Decimal,
    pub stop_adjustments: u32,
    pub step_activations: u32,
    pub denials: u32,
    /// Denial count by reason label
    pub denial_reasons: BTreeMap<String, u32>,
    pub risk: RiskMetrics,
}

impl SimulationReport {
    pub fn format_table(&self) -> String {
        let mut denials = String::new();
        for (reason, count) in &self.denial_reasons {
            denials.push_str(&format!("  {reason:<22}{count}\n"));
        }

        format!(
            r#"
══════════════════════════════════════════════════════
               SIMULATION RESULTS ({})
══════════════════════════════════════════════════════

PERFORMANCE
───────────────────────────────────────────────────────
Realized P&L:     {:+.2}
Balance:          {:.2} -> {:.2}
Win Rate:         {:.1}%
Risk Level:       {}

ACTIVITY
───────────────────────────────────────────────────────
Ticks:            {}
Entries:          {}
Closed Trades:    {} ({} won, {} lost)
Stop Moves:       {}
Steps Activated:  {}
Denials:          {}
{}══════════════════════════════════════════════════════
"#,
            self.instrument,
            self.realized_pnl,
            self.initial_balance,
            self.final_balance,
            self.win_rate,
            self.risk.risk_level,
            self.ticks,
            self.entries,
            self.trades,
            self.wins,
            self.losses,
            self.stop_adjustments,
            self.step_activations,
            self.denials,
            denials,
        )
    }
}
