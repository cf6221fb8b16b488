use soroban_sdk::{Address, Env, Vec};

/// Outcome of choosing a cycle's beneficiary from the queue.
pub struct Selection {
    pub beneficiary: Address,
    pub graced: bool,
    pub order: Vec<Address>,
}

/// Pick the beneficiary from `order`.
///
/// The first eligible entry that paid wins. Eligible entries that defaulted
/// ahead of it are moved, in their original relative order, to directly
/// behind it. Past beneficiaries always form a prefix of the queue, so the
/// ineligible entries ahead of the winner never move. When no eligible entry
/// paid, the front-most eligible entry is selected as a graced defaulter and
/// the order is left untouched. Returns `None` when nothing is eligible.
pub fn select_beneficiary<E, P>(
    env: &Env,
    order: &Vec<Address>,
    is_eligible: E,
    has_paid: P,
) -> Option<Selection>
where
    E: Fn(&Address) -> bool,
    P: Fn(&Address) -> bool,
{
    let mut first_eligible: Option<u32> = None;
    let mut first_payer: Option<u32> = None;

    for (i, candidate) in order.iter().enumerate() {
        if !is_eligible(&candidate) {
            continue;
        }
        if first_eligible.is_none() {
            first_eligible = Some(i as u32);
        }
        if has_paid(&candidate) {
            first_payer = Some(i as u32);
            break;
        }
    }

    match (first_payer, first_eligible) {
        (Some(pos), _) => {
            let beneficiary = order.get(pos)?;
            let mut front = Vec::new(env);
            let mut demoted = Vec::new(env);
            for i in 0..pos {
                let entry = order.get(i)?;
                if is_eligible(&entry) {
                    demoted.push_back(entry);
                } else {
                    front.push_back(entry);
                }
            }
            front.push_back(beneficiary.clone());
            front.append(&demoted);
            for i in (pos + 1)..order.len() {
                front.push_back(order.get(i)?);
            }
            Some(Selection {
                beneficiary,
                graced: false,
                order: front,
            })
        }
        (None, Some(pos)) => Some(Selection {
            beneficiary: order.get(pos)?,
            graced: true,
            order: order.clone(),
        }),
        (None, None) => None,
    }
}
