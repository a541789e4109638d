/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::linalg::DVector;
use crate::opti::NlpProblem;
use crate::problem::BolzaProblem;
use crate::propagators::Integrator;
use crate::OcpError;

mod codec;
pub use codec::*;
mod constraints;
pub use constraints::*;
mod cost;
pub use cost::*;

/// The direct multiple shooting transcription of a Bolza problem into a nonlinear program.
///
/// Holds everything the objective and constraint evaluations need: the problem, the initial
/// state, the decision layout and the integrator. Nothing in here changes after construction.
pub struct Transcription<'a, P: BolzaProblem + ?Sized> {
    pub x0: DVector<f64>,
    pub layout: DecisionLayout,
    cost: CostEvaluator<'a, P>,
    assembler: ConstraintAssembler<'a, P>,
}

impl<'a, P: BolzaProblem + ?Sized> Transcription<'a, P> {
    /// Builds the transcription, fixing the constraint sizes by evaluating the problem once on the initial guess.
    pub fn new(
        problem: &'a P,
        x0: DVector<f64>,
        layout: DecisionLayout,
        integrator: Integrator,
        parallel: bool,
    ) -> Result<Self, OcpError> {
        let guess = layout.decode(&layout.initial_guess(), &x0)?;
        let constraint_layout = ConstraintLayout::from_first_evaluation(problem, &guess, layout.free_final_time());

        Ok(Self {
            x0,
            layout,
            cost: CostEvaluator::new(problem, integrator),
            assembler: ConstraintAssembler::new(problem, integrator, constraint_layout, parallel),
        })
    }

    pub fn constraint_layout(&self) -> ConstraintLayout {
        self.assembler.layout
    }

    pub fn decode(&self, w: &DVector<f64>) -> Result<DecodedGuess, OcpError> {
        self.layout.decode(w, &self.x0)
    }

    /// Largest defect norm over all of the shooting intervals
    pub fn max_defect(&self, guess: &DecodedGuess) -> Result<f64, OcpError> {
        Ok(self
            .assembler
            .defects(guess)?
            .iter()
            .fold(0.0_f64, |acc, defect| acc.max(defect.norm())))
    }
}

impl<'a, P: BolzaProblem + ?Sized> NlpProblem for Transcription<'a, P> {
    fn dimension(&self) -> usize {
        self.layout.len()
    }

    fn initial_guess(&self) -> DVector<f64> {
        self.layout.initial_guess()
    }

    fn objective(&self, w: &DVector<f64>) -> Result<f64, OcpError> {
        self.cost.evaluate(&self.decode(w)?)
    }

    fn constraints(&self, w: &DVector<f64>) -> Result<Constraints, OcpError> {
        self.assembler.assemble(&self.decode(w)?)
    }
}
