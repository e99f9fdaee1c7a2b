use super::types::{LeaderPlan, StreamLeaders, TeamMember};
use crate::model::{Roster, RosterEntry};

/// Répartit les VSL sur les value streams `(nom, nombre de lignes)`.
pub(super) fn resolve_leaders(leaders: &[RosterEntry], streams: &[(&str, usize)]) -> LeaderPlan {
    if leaders.is_empty() || streams.is_empty() {
        return LeaderPlan::Unassigned;
    }
    if leaders.len() == 1 {
        return LeaderPlan::Global {
            leader_id: leaders[0].id.clone(),
        };
    }

    let mut ids: Vec<Vec<String>> = vec![Vec::new(); streams.len()];

    if leaders.len() == streams.len() {
        for (slot, leader) in ids.iter_mut().zip(leaders) {
            slot.push(leader.id.clone());
        }
    } else {
        // tri stable : à égalité, l'ordre déclaré est conservé
        let mut by_size: Vec<usize> = (0..streams.len()).collect();
        by_size.sort_by(|a, b| streams[*b].1.cmp(&streams[*a].1));

        if leaders.len() < streams.len() {
            let mut load = vec![0usize; leaders.len()];
            for &s in &by_size {
                let best = (1..leaders.len()).fold(0, |best, i| {
                    if load[i] < load[best] {
                        i
                    } else {
                        best
                    }
                });
                ids[s].push(leaders[best].id.clone());
                load[best] += streams[s].1;
            }
        } else {
            let mut queue = leaders.iter();
            for &s in &by_size {
                if let Some(leader) = queue.next() {
                    ids[s].push(leader.id.clone());
                }
            }
            let largest = by_size[0];
            ids[largest].extend(queue.map(|l| l.id.clone()));
        }
    }

    let mut plan = Vec::with_capacity(streams.len());
    for ((stream, _), leader_ids) in streams.iter().zip(ids) {
        if leader_ids.is_empty() {
            tracing::warn!(stream = %stream, "value stream has no leader, skipped for VSL/CFT audits");
            continue;
        }
        plan.push(StreamLeaders {
            stream: (*stream).to_string(),
            leader_ids,
        });
    }
    LeaderPlan::PerStream(plan)
}

/// Équipe d'un value stream : chaque VSL suivi de ses membres CFT.
pub(super) fn assemble_team(roster: &Roster, leader_ids: &[String]) -> Vec<TeamMember> {
    let mut team = Vec::new();
    for id in leader_ids {
        let Some(leader) = roster.find_leader(id) else {
            continue;
        };
        team.push(TeamMember::vsl(leader.label_or("VSL")));
        team.extend(
            roster
                .members_of(id)
                .map(|member| TeamMember::cft(member.label_or("CFT"))),
        );
    }
    team
}

/// Équipe du mode global : le VSL unique puis tous les membres CFT.
pub(super) fn global_team(roster: &Roster, leader: &RosterEntry) -> Vec<TeamMember> {
    let mut team = vec![TeamMember::vsl(leader.label_or("VSL"))];
    team.extend(
        roster
            .cross_functional_teams
            .iter()
            .map(|member| TeamMember::cft(member.label_or("CFT"))),
    );
    team
}
