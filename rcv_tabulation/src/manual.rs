/*!

This is the long-form manual for `rcv_tabulation` and `rcvtab`.

## Counting rules

All the seats are filled through successive rounds. The ballots are ranked lists of
candidate names, most preferred first.

**Win number** The win number is a simple majority of the ballots cast:
`floor(n / 2) + 1`, where `n` is the number of non-empty ballots (with their weights)
when the election is created. It stays the same for the whole election, even as
ballots get exhausted.

**Tally** At the start of each round, the first choice of every ballot is counted.
The tally includes every candidate still named on a ballot, with zero votes if
nobody ranks them first. It is sorted by decreasing number of votes. Candidates with
the same number of votes are kept in *candidate order*: the order in which the names
first appear when reading the ballots from the first one to the last one.

Each round then applies the first rule that matches:

1. Any candidate with at least the win number of votes is elected and removed from
   all the ballots.
2. If more than one seat is being filled, the protected candidate is last in the
   tally and exactly one more candidate remains than seats to fill, the protected
   candidate is removed.
3. If there are no more candidates left than seats to fill, all of them are elected.
4. If exactly one more candidate remains than seats to fill, the last candidate of the
   tally is eliminated and all the others are elected, in tally order.
5. If only two candidates hold first-choice votes, the second one is eliminated and
   the first one is elected.
6. Otherwise the last candidate of the tally is eliminated. If that candidate is the
   protected candidate, the candidate just above it is eliminated instead.

Eliminated and elected candidates are removed from every ballot. The other choices
move up in rank. A ballot with no choice left is exhausted and no longer counted.

**Ties** Because ties keep candidate order and the last candidate of the tally is
eliminated, the candidate named latest loses a tie for last place.

## Configuration

`rcvtab` reads an election description in JSON:

```json
{
  "outputSettings": {
    "contestName": "Board of Directors",
    "contestDate": "2024-05-01",
    "outputPath": "board_summary.json"
  },
  "cvrFileSources": [
    { "provider": "csv", "filePath": "board.csv", "firstVoteColumnIndex": 2, "firstVoteRowIndex": 2 }
  ],
  "rules": { "numberOfWinners": 2, "protectedCandidate": "No Endorsement" }
}
```

### `csv`

One ballot per row. The ranks start at column `firstVoteColumnIndex` (starting at 1),
and the ballots start at row `firstVoteRowIndex` (starting at 1, use 2 to skip a header).
Empty cells are skipped. `idColumnIndex` and `countColumnIndex` optionally point to a
ballot identifier and to a number of identical ballots.

## Command line

All the rules can also be given directly:

```bash
rcvtab --input board.csv --winners 2 --protected "No Endorsement" --name "Board" --format html
```

`--out` writes the JSON summary of all the rounds, `--reference` compares this summary
with a previous one and fails if they differ.
*/
