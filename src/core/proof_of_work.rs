use crate::core::hasher::meets_difficulty;
use crate::core::Block;
use data_encoding::HEXLOWER;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Deadline checks read the clock, so only do it every this many attempts
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Cooperative cancellation for a nonce search.
///
/// Clones share the same flag, so a token handed to a mining thread can be
/// cancelled from anywhere else. An optional deadline cancels the search once
/// it passes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn with_deadline(deadline: Instant) -> CancelToken {
        CancelToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> CancelToken {
        CancelToken::with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// How a nonce search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiningOutcome {
    /// The block now carries a hash satisfying the difficulty
    Sealed(Block),
    /// The token was cancelled or its deadline passed
    Cancelled { attempts: u64 },
    /// Every nonce up to `u64::MAX` was tried without success
    Exhausted,
}

impl MiningOutcome {
    pub fn into_block(self) -> Option<Block> {
        match self {
            MiningOutcome::Sealed(block) => Some(block),
            _ => None,
        }
    }
}

/// Result of a single search iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    Found,
    Continue,
    Exhausted,
}

/// Nonce search over one candidate block.
///
/// The search is explicit: [`try_nonce`](ProofOfWork::try_nonce) performs one
/// attempt, so a host can drive it in slices or hand it to a worker thread.
pub struct ProofOfWork {
    block: Block,
    difficulty: u32,
    nonce: u64,
    attempts: u64,
    found: Option<[u8; 32]>,
}

impl ProofOfWork {
    pub fn new_proof_of_work(block: Block, difficulty: u32) -> ProofOfWork {
        ProofOfWork {
            nonce: block.get_nonce(),
            block,
            difficulty,
            attempts: 0,
            found: None,
        }
    }

    /// Check a block's recorded hash against its fields and the difficulty.
    pub fn validate(block: &Block, difficulty: u32) -> bool {
        block.has_consistent_hash() && block.meets_difficulty(difficulty)
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_attempts(&self) -> u64 {
        self.attempts
    }

    /// Hash the block at the current nonce; advance the nonce on a miss.
    pub fn try_nonce(&mut self) -> SearchStep {
        if self.found.is_some() {
            return SearchStep::Found;
        }

        let hash = self.block.hash_with_nonce(self.nonce);
        self.attempts += 1;

        if meets_difficulty(&hash, self.difficulty) {
            self.found = Some(hash);
            return SearchStep::Found;
        }

        match self.nonce.checked_add(1) {
            Some(next) => {
                self.nonce = next;
                SearchStep::Continue
            }
            None => SearchStep::Exhausted,
        }
    }

    /// Search until a satisfying nonce is found or `cancel` fires.
    ///
    /// Cancellation is checked before every attempt, so a token that is
    /// already cancelled returns without hashing.
    pub fn run(mut self, cancel: &CancelToken) -> MiningOutcome {
        debug!(
            "Mining block {} at difficulty {}",
            self.block.get_index(),
            self.difficulty
        );

        loop {
            if cancel.is_cancelled()
                || (self.attempts % DEADLINE_CHECK_INTERVAL == 0 && cancel.deadline_passed())
            {
                info!(
                    "Mining of block {} cancelled after {} attempts",
                    self.block.get_index(),
                    self.attempts
                );
                return MiningOutcome::Cancelled {
                    attempts: self.attempts,
                };
            }

            match self.try_nonce() {
                SearchStep::Found => return MiningOutcome::Sealed(self.finish_sealed()),
                SearchStep::Continue => continue,
                SearchStep::Exhausted => return MiningOutcome::Exhausted,
            }
        }
    }

    fn finish_sealed(mut self) -> Block {
        if let Some(hash) = self.found {
            self.block.seal(self.nonce, hash);
            info!(
                "Block mined: {} (nonce {}, {} attempts)",
                HEXLOWER.encode(&hash),
                self.nonce,
                self.attempts
            );
        }
        self.block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(payload: &str) -> Block {
        Block::new_candidate(1, payload, vec![0xAA; 32]).unwrap()
    }

    #[test]
    fn test_difficulty_zero_seals_on_first_attempt() {
        let mut pow = ProofOfWork::new_proof_of_work(candidate("A"), 0);
        assert_eq!(pow.try_nonce(), SearchStep::Found);
        assert_eq!(pow.get_attempts(), 1);

        let block = ProofOfWork::new_proof_of_work(candidate("A"), 0)
            .run(&CancelToken::new())
            .into_block()
            .unwrap();
        assert_eq!(block.get_nonce(), 0);
        assert!(ProofOfWork::validate(&block, 0));
    }

    #[test]
    fn test_sealed_block_meets_difficulty() {
        for difficulty in 0..=2 {
            let block = ProofOfWork::new_proof_of_work(candidate("A"), difficulty)
                .run(&CancelToken::new())
                .into_block()
                .unwrap();

            assert!(block.get_hash()[..difficulty as usize].iter().all(|b| *b == 0));
            assert_eq!(block.get_hash(), block.calculate_hash().as_slice());
            assert!(ProofOfWork::validate(&block, difficulty));
        }
    }

    #[test]
    fn test_difficulty_two_hex_prefix() {
        let block = ProofOfWork::new_proof_of_work(candidate("A"), 2)
            .run(&CancelToken::new())
            .into_block()
            .unwrap();
        assert!(block.get_hash_hex().starts_with("0000"));
    }

    #[test]
    fn test_try_nonce_advances_on_miss() {
        // 32 zero bytes is practically unreachable, so every attempt misses
        let mut pow = ProofOfWork::new_proof_of_work(candidate("A"), 32);
        for expected in 1..=5 {
            assert_eq!(pow.try_nonce(), SearchStep::Continue);
            assert_eq!(pow.get_nonce(), expected);
        }
        assert_eq!(pow.get_attempts(), 5);
    }

    #[test]
    fn test_pre_cancelled_token_stops_immediately() {
        let token = CancelToken::new();
        token.cancel();

        let outcome = ProofOfWork::new_proof_of_work(candidate("A"), 0).run(&token);
        assert_eq!(outcome, MiningOutcome::Cancelled { attempts: 0 });
    }

    #[test]
    fn test_deadline_cancels_unbounded_search() {
        let token = CancelToken::with_timeout(Duration::from_millis(50));
        let outcome = ProofOfWork::new_proof_of_work(candidate("A"), 32).run(&token);
        assert!(matches!(outcome, MiningOutcome::Cancelled { .. }));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let token = CancelToken::new();
        let worker_token = token.clone();
        let handle = std::thread::spawn(move || {
            ProofOfWork::new_proof_of_work(candidate("A"), 32).run(&worker_token)
        });

        std::thread::sleep(Duration::from_millis(20));
        token.cancel();

        let outcome = handle.join().unwrap();
        assert!(matches!(outcome, MiningOutcome::Cancelled { .. }));
    }

    #[test]
    fn test_validate_rejects_unsealed_block() {
        assert!(!ProofOfWork::validate(&candidate("A"), 0));
    }
}
