// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topological evaluation of invalid processors.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::HashMap;

use crate::attributes::InvalidationLevel;
use crate::id::ProcessorId;
use crate::network::{Network, NetworkEvent};

impl Network {
    /// Processes every invalid, ready processor, upstream before downstream.
    ///
    /// For each processor, in order: its changed inports' callbacks run, its
    /// behavior's [`process`](crate::Process::process) runs, then it and all
    /// its properties become valid again. Processors that are not
    /// [ready](Self::is_ready) stay invalid.
    ///
    /// Invalidations raised while processing are picked up by further passes,
    /// up to [`max_evaluation_passes`](crate::NetworkConfig::max_evaluation_passes).
    /// Calling `evaluate` from inside a running evaluation only records that
    /// another pass is needed.
    ///
    /// Returns the number of processors processed.
    pub fn evaluate(&mut self) -> usize {
        if self.evaluating {
            self.evaluation_pending = true;
            return 0;
        }
        self.evaluating = true;
        self.evaluation_pending = false;
        let mut processed = 0;
        let mut passes = 0;
        loop {
            passes += 1;
            let order = self.evaluation_order();
            let mut progress = 0;
            for processor in order {
                if self.invalidation_level(processor) == InvalidationLevel::Valid {
                    continue;
                }
                if !self.is_ready(processor) {
                    log::trace!("skipping {processor:?}: not ready");
                    continue;
                }
                self.process_one(processor);
                progress += 1;
            }
            processed += progress;
            if !self.evaluation_pending || progress == 0 {
                break;
            }
            if passes >= self.config.max_evaluation_passes {
                log::warn!(
                    "evaluation stopped after {passes} passes with processors still invalid"
                );
                break;
            }
            self.evaluation_pending = false;
        }
        self.evaluating = false;
        self.evaluation_pending = false;
        log::debug!("evaluated {processed} processor(s) in {passes} pass(es)");
        processed
    }

    fn process_one(&mut self, processor: ProcessorId) {
        self.fire_inport_changes(processor);
        let behavior = self
            .processor_state_mut(processor)
            .and_then(|state| state.behavior.take());
        if let Some(mut behavior) = behavior {
            self.processing = Some(processor);
            behavior.process(self, processor);
            self.processing = None;
            if let Some(state) = self.processor_state_mut(processor) {
                state.behavior = Some(behavior);
            }
        }
        if self.contains_processor(processor) {
            self.set_owner_valid(processor.owner());
            self.clear_inport_changes(processor);
            self.emit(NetworkEvent::ProcessorEvaluated(processor));
        }
    }

    /// Invalid processors sorted so that every processor comes after the
    /// processors feeding it. Ties keep creation order.
    fn evaluation_order(&self) -> Vec<ProcessorId> {
        let invalid: Vec<ProcessorId> = self
            .processors
            .iter()
            .copied()
            .filter(|p| self.invalidation_level(*p) > InvalidationLevel::Valid)
            .collect();
        let rank: HashMap<ProcessorId, usize> =
            invalid.iter().enumerate().map(|(i, p)| (*p, i)).collect();

        let mut in_degree = vec![0_usize; invalid.len()];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); invalid.len()];
        for connection in &self.connections {
            if let (Some(&from), Some(&to)) = (
                rank.get(&connection.outport.processor),
                rank.get(&connection.inport.processor),
            ) {
                successors[from].push(to);
                in_degree[to] += 1;
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();
        let mut order = Vec::with_capacity(invalid.len());
        while let Some(Reverse(i)) = ready.pop() {
            order.push(invalid[i]);
            for &next in &successors[i] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        order
    }
}
