use crate::domain::model::{Player, PlayerId};

/// One vote: `voter` chose the card played by `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    pub voter: PlayerId,
    pub owner: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundScore {
    pub storyteller_votes: usize,
    /// Points gained this round, indexed by `PlayerId`.
    pub deltas: Vec<u32>,
}

/// 計分規則
///
/// 1. 沒人或所有人都找到說書人的牌：其他玩家各 +2，說書人 0 分。
/// 2. 否則說書人 +3，找到的玩家各 +3。
/// 3. 另外，非說書人的牌每被另一位非說書人投一票就 +1。
///    投給說書人的票只在規則 1/2 計算一次。
pub fn score_round(player_count: usize, storyteller: PlayerId, ballots: &[Ballot]) -> RoundScore {
    let mut deltas = vec![0u32; player_count];

    let storyteller_votes = ballots
        .iter()
        .filter(|ballot| ballot.owner == storyteller)
        .count();
    debug_assert!(storyteller_votes <= player_count.saturating_sub(1));

    if storyteller_votes == 0 || storyteller_votes == player_count - 1 {
        for (id, delta) in deltas.iter_mut().enumerate() {
            if PlayerId(id) != storyteller {
                *delta += 2;
            }
        }
    } else {
        deltas[storyteller.0] += 3;
        for ballot in ballots.iter().filter(|b| b.owner == storyteller) {
            deltas[ballot.voter.0] += 3;
        }
    }

    for ballot in ballots {
        if ballot.owner != storyteller && ballot.owner != ballot.voter {
            deltas[ballot.owner.0] += 1;
        }
    }

    RoundScore {
        storyteller_votes,
        deltas,
    }
}

/// Highest score wins; on a tie the player seated first wins.
pub fn winner(players: &[Player]) -> Option<&Player> {
    players.iter().fold(None, |best: Option<&Player>, player| match best {
        Some(current) if current.score >= player.score => Some(current),
        _ => Some(player),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballot(voter: usize, owner: usize) -> Ballot {
        Ballot {
            voter: PlayerId(voter),
            owner: PlayerId(owner),
        }
    }

    #[test]
    fn test_two_of_three_find_the_storyteller() {
        // Player 0 tells; 1 and 2 find the card; 3 votes for player 1's card.
        let score = score_round(4, PlayerId(0), &[ballot(1, 0), ballot(2, 0), ballot(3, 1)]);

        assert_eq!(score.storyteller_votes, 2);
        assert_eq!(score.deltas, vec![3, 4, 3, 0]);
    }

    #[test]
    fn test_nobody_finds_the_storyteller() {
        let score = score_round(4, PlayerId(2), &[ballot(0, 1), ballot(1, 3), ballot(3, 1)]);

        assert_eq!(score.storyteller_votes, 0);
        // +2 each, plus +1 per vote received from another guesser.
        assert_eq!(score.deltas, vec![2, 4, 0, 3]);
    }

    #[test]
    fn test_everybody_finds_the_storyteller() {
        let score = score_round(4, PlayerId(1), &[ballot(0, 1), ballot(2, 1), ballot(3, 1)]);

        assert_eq!(score.storyteller_votes, 3);
        assert_eq!(score.deltas, vec![2, 0, 2, 2]);
    }

    #[test]
    fn test_storyteller_votes_are_not_double_counted() {
        // The +1 bonus never goes to the storyteller, in either branch.
        let found_by_some = score_round(3, PlayerId(0), &[ballot(1, 0), ballot(2, 1)]);
        assert_eq!(found_by_some.deltas, vec![3, 4, 0]);

        let found_by_all = score_round(3, PlayerId(0), &[ballot(1, 0), ballot(2, 0)]);
        assert_eq!(found_by_all.deltas, vec![0, 2, 2]);
    }

    #[test]
    fn test_vote_for_own_card_earns_nothing() {
        let score = score_round(3, PlayerId(0), &[ballot(1, 1), ballot(2, 0)]);

        assert_eq!(score.storyteller_votes, 1);
        assert_eq!(score.deltas, vec![3, 0, 3]);
    }

    #[test]
    fn test_storyteller_votes_stay_in_range() {
        for storyteller in 0..4 {
            for owner in 0..4 {
                let ballots: Vec<Ballot> = (0..4)
                    .filter(|voter| *voter != storyteller)
                    .map(|voter| ballot(voter, owner))
                    .collect();
                let score = score_round(4, PlayerId(storyteller), &ballots);
                assert!(score.storyteller_votes <= 3);
                assert_eq!(
                    score.deltas[storyteller] == 0,
                    score.storyteller_votes == 0 || score.storyteller_votes == 3
                );
            }
        }
    }

    #[test]
    fn test_winner_tie_goes_to_first_seat() {
        let mut players: Vec<Player> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, name)| Player::new(PlayerId(i), *name))
            .collect();
        players[0].score = 5;
        players[1].score = 9;
        players[2].score = 9;

        assert_eq!(winner(&players).unwrap().name, "b");
        assert!(winner(&[]).is_none());
    }
}
