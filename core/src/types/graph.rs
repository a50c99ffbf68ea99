// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Chain graph
//!
//! Chainweb networks braid their chains following a fixed graph: every block
//! header references the headers of the adjacent chains at the previous height.
//! Proving a block of one chain on another chain thus follows a path in that
//! graph, one header per hop.

use crate::types::error::GraphError;
use crate::types::ChainId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::OnceLock;

/// Graph of a two chain network.
pub const PAIR_CHAIN_GRAPH: [[ChainId; 1]; 2] = [[1], [0]];

/// Graph of a three chain network.
pub const TRIANGLE_CHAIN_GRAPH: [[ChainId; 2]; 3] = [[1, 2], [0, 2], [0, 1]];

/// Graph of a ten chain network, the Petersen graph.
pub const PETERSEN_CHAIN_GRAPH: [[ChainId; 3]; 10] = [
    [2, 3, 5],
    [3, 4, 6],
    [4, 0, 7],
    [0, 1, 8],
    [1, 2, 9],
    [0, 6, 9],
    [1, 5, 7],
    [2, 6, 8],
    [3, 7, 9],
    [4, 5, 8],
];

/// Graph of a twenty chain network, the one used by Kadena mainnet.
pub const TWENTY_CHAIN_GRAPH: [[ChainId; 3]; 20] = [
    [10, 15, 5],
    [11, 16, 6],
    [12, 17, 7],
    [13, 18, 8],
    [14, 19, 9],
    [0, 7, 8],
    [1, 8, 9],
    [2, 5, 9],
    [3, 5, 6],
    [4, 6, 7],
    [0, 11, 19],
    [1, 10, 12],
    [11, 13, 2],
    [12, 14, 3],
    [13, 15, 4],
    [0, 14, 16],
    [1, 15, 17],
    [16, 18, 2],
    [17, 19, 3],
    [10, 18, 4],
];

/// Adjacency list of a chain graph, indexed by chain id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<ChainId>>", into = "Vec<Vec<ChainId>>")]
pub struct ChainGraph {
    adjacency: Vec<Vec<ChainId>>,
}

impl ChainGraph {
    /// Creates a graph from an adjacency list.
    ///
    /// # Arguments
    ///
    /// * `adjacency` - The neighbors of each chain, indexed by chain id.
    ///
    /// # Returns
    ///
    /// The graph, or an error if a neighbor is not a chain of the graph.
    pub fn new(adjacency: Vec<Vec<ChainId>>) -> Result<Self, GraphError> {
        let order = adjacency.len();
        if let Some(chain) = adjacency
            .iter()
            .flatten()
            .find(|chain| **chain as usize >= order)
        {
            return Err(GraphError::UnknownChain {
                chain: *chain,
                order,
            });
        }

        Ok(Self { adjacency })
    }

    fn from_rows<const D: usize>(rows: &[[ChainId; D]]) -> Self {
        Self {
            adjacency: rows.iter().map(|row| row.to_vec()).collect(),
        }
    }

    /// Returns the built-in graph for networks of `order` chains.
    ///
    /// # Arguments
    ///
    /// * `order` - The number of chains of the network.
    ///
    /// # Returns
    ///
    /// A reference to the process-wide graph, or [`GraphError::UnsupportedTopology`]
    /// if there is no known graph for that number of chains.
    pub fn builtin(order: usize) -> Result<&'static Self, GraphError> {
        static PAIR: OnceLock<ChainGraph> = OnceLock::new();
        static TRIANGLE: OnceLock<ChainGraph> = OnceLock::new();
        static PETERSEN: OnceLock<ChainGraph> = OnceLock::new();
        static TWENTY: OnceLock<ChainGraph> = OnceLock::new();

        match order {
            2 => Ok(PAIR.get_or_init(|| Self::from_rows(&PAIR_CHAIN_GRAPH))),
            3 => Ok(TRIANGLE.get_or_init(|| Self::from_rows(&TRIANGLE_CHAIN_GRAPH))),
            10 => Ok(PETERSEN.get_or_init(|| Self::from_rows(&PETERSEN_CHAIN_GRAPH))),
            20 => Ok(TWENTY.get_or_init(|| Self::from_rows(&TWENTY_CHAIN_GRAPH))),
            order => Err(GraphError::UnsupportedTopology { order }),
        }
    }

    /// Number of chains in the graph.
    pub fn order(&self) -> usize {
        self.adjacency.len()
    }

    /// Neighbors of a chain, in adjacency-list order.
    pub fn neighbors(&self, chain: ChainId) -> Result<&[ChainId], GraphError> {
        self.adjacency
            .get(chain as usize)
            .map(Vec::as_slice)
            .ok_or(GraphError::UnknownChain {
                chain,
                order: self.order(),
            })
    }

    /// Computes the shortest path between two chains with a breadth-first
    /// search. Ties are broken by adjacency-list order.
    ///
    /// # Arguments
    ///
    /// * `from` - The source chain.
    /// * `to` - The target chain.
    ///
    /// # Returns
    ///
    /// The path, source first and target last. A chain routes to itself
    /// through a single element path.
    pub fn shortest_path(&self, from: ChainId, to: ChainId) -> Result<Vec<ChainId>, GraphError> {
        self.neighbors(from)?;
        self.neighbors(to)?;

        let mut previous: Vec<Option<ChainId>> = vec![None; self.order()];
        let mut visited = vec![false; self.order()];
        let mut queue = VecDeque::from([from]);
        visited[from as usize] = true;

        while let Some(chain) = queue.pop_front() {
            if chain == to {
                let mut path = vec![to];
                let mut current = to;
                while let Some(prev) = previous[current as usize] {
                    path.push(prev);
                    current = prev;
                }
                path.reverse();
                return Ok(path);
            }

            for neighbor in self.neighbors(chain)? {
                if !visited[*neighbor as usize] {
                    visited[*neighbor as usize] = true;
                    previous[*neighbor as usize] = Some(chain);
                    queue.push_back(*neighbor);
                }
            }
        }

        Err(GraphError::ChainUnreachable { from, to })
    }
}

impl TryFrom<Vec<Vec<ChainId>>> for ChainGraph {
    type Error = GraphError;

    fn try_from(adjacency: Vec<Vec<ChainId>>) -> Result<Self, Self::Error> {
        Self::new(adjacency)
    }
}

impl From<ChainGraph> for Vec<Vec<ChainId>> {
    fn from(graph: ChainGraph) -> Self {
        graph.adjacency
    }
}
