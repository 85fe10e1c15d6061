// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use crate::error::ScheduleError;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceValue {
    Literal(bool),
    Random,
}

/// Cyclic source of values for one boolean parameter
///
/// Written as a string over `0`, `1` and `*`, where `*` draws a fair coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanSequence {
    values: Vec<SequenceValue>,

    cursor: usize,
}

impl BooleanSequence {
    pub fn parse(parameter: &str, text: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidSequence {
            parameter: parameter.to_string(),
            sequence: text.to_string(),
        };
        let values = text
            .chars()
            .map(|c| match c {
                '0' => Ok(SequenceValue::Literal(false)),
                '1' => Ok(SequenceValue::Literal(true)),
                '*' => Ok(SequenceValue::Random),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if values.is_empty() {
            return Err(invalid());
        }
        Ok(Self { values, cursor: 0 })
    }

    pub fn next_value<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let value = match self.values[self.cursor] {
            SequenceValue::Literal(value) => value,
            SequenceValue::Random => rng.gen_bool(0.5),
        };
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }
}
